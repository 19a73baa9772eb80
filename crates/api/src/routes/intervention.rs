use axum::routing::{get, post};
use axum::Router;

use crate::handlers::intervention;
use crate::state::AppState;

/// Routes mounted at `/interventions`.
///
/// ```text
/// POST /{id}/complete    -> complete
/// POST /{id}/postpone    -> postpone
/// POST /{id}/schedule    -> schedule
/// POST /{id}/cancel      -> cancel
/// GET  /due              -> list_due
/// GET  /overdue          -> list_overdue
/// GET  /current-week     -> list_current_week
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/complete", post(intervention::complete))
        .route("/{id}/postpone", post(intervention::postpone))
        .route("/{id}/schedule", post(intervention::schedule))
        .route("/{id}/cancel", post(intervention::cancel))
        .route("/due", get(intervention::list_due))
        .route("/overdue", get(intervention::list_overdue))
        .route("/current-week", get(intervention::list_current_week))
}

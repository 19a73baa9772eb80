use axum::routing::post;
use axum::Router;

use crate::handlers::contract;
use crate::state::AppState;

/// Routes mounted at `/contracts`.
///
/// ```text
/// POST /{id}/initial-plan   -> generate_initial_plan
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/initial-plan", post(contract::generate_initial_plan))
}

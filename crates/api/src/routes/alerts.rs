use axum::routing::get;
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET  /contracts-without-future-visit   -> contracts_without_future_visit
/// GET  /one-off-nearing-completion       -> one_off_nearing_completion
/// GET  /contracts-past-end-date          -> contracts_past_end_date
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/contracts-without-future-visit",
            get(alerts::contracts_without_future_visit),
        )
        .route(
            "/one-off-nearing-completion",
            get(alerts::one_off_nearing_completion),
        )
        .route("/contracts-past-end-date", get(alerts::contracts_past_end_date))
}

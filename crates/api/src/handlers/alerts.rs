//! Handlers for the anti-forgetting alerts.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use sentinelle_core::alert;
use sentinelle_db::PgSchedulingStore;

use crate::error::AppResult;
use crate::handlers::today;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/alerts/contracts-without-future-visit
pub async fn contracts_without_future_visit(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let mut store = PgSchedulingStore::begin(&state.pool).await?;
    let alerts = alert::list_contracts_without_future_visit(&mut store, today()).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /api/v1/alerts/one-off-nearing-completion
pub async fn one_off_nearing_completion(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let mut store = PgSchedulingStore::begin(&state.pool).await?;
    let alerts = alert::list_one_off_nearing_completion(&mut store).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /api/v1/alerts/contracts-past-end-date
pub async fn contracts_past_end_date(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let mut store = PgSchedulingStore::begin(&state.pool).await?;
    let alerts = alert::list_contracts_past_end_date(&mut store).await?;
    Ok(Json(DataResponse { data: alerts }))
}

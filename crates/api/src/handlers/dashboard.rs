use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use sentinelle_core::dashboard;
use sentinelle_db::PgSchedulingStore;

use crate::error::AppResult;
use crate::handlers::today;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard/stats
pub async fn stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut store = PgSchedulingStore::begin(&state.pool).await?;
    let stats = dashboard::dashboard_stats(&mut store, today(), &state.config.dashboard).await?;
    Ok(Json(DataResponse { data: stats }))
}

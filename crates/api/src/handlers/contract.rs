//! Handlers for contract-level planning.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use sentinelle_core::planning;
use sentinelle_core::types::DbId;
use sentinelle_db::PgSchedulingStore;

use crate::error::AppResult;
use crate::extract::Actor;
use crate::handlers::today;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/contracts/{id}/initial-plan
///
/// Generate the initial calendar of an active contract.
pub async fn generate_initial_plan(
    State(state): State<AppState>,
    actor: Actor,
    Path(contract_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mut store = PgSchedulingStore::begin(&state.pool).await?;
    let plan = planning::generate_initial_plan(&mut store, contract_id, today()).await?;
    store.commit().await?;

    tracing::info!(
        contract_id,
        actor_id = actor.user_id,
        created = plan.count,
        "Initial plan committed"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: plan })))
}

//! Handlers for single-visit transitions and visit lists.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use sentinelle_core::completion::{self, CompleteIntervention};
use sentinelle_core::reschedule::{
    self, CancelIntervention, PostponeIntervention, ScheduleIntervention,
};
use sentinelle_core::types::DbId;
use sentinelle_core::window;
use sentinelle_db::PgSchedulingStore;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::Actor;
use crate::handlers::today;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// POST /api/v1/interventions/{id}/complete
pub async fn complete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(body): Json<CompleteIntervention>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;

    let mut store = PgSchedulingStore::begin(&state.pool).await?;
    let outcome = completion::complete_intervention(&mut store, id, actor.user_id, &body).await?;
    store.commit().await?;

    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/interventions/{id}/postpone
pub async fn postpone(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(body): Json<PostponeIntervention>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;

    let mut store = PgSchedulingStore::begin(&state.pool).await?;
    let updated = reschedule::postpone(&mut store, id, actor.user_id, &body, Utc::now()).await?;
    store.commit().await?;

    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/interventions/{id}/schedule
pub async fn schedule(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(body): Json<ScheduleIntervention>,
) -> AppResult<impl IntoResponse> {
    let mut store = PgSchedulingStore::begin(&state.pool).await?;
    let updated = reschedule::schedule(&mut store, id, actor.user_id, &body).await?;
    store.commit().await?;

    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/interventions/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(body): Json<CancelIntervention>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;

    let mut store = PgSchedulingStore::begin(&state.pool).await?;
    let updated = reschedule::cancel(&mut store, id, actor.user_id, &body, Utc::now()).await?;
    store.commit().await?;

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DueParams {
    /// Look-ahead in days. Defaults to the configured due-soon window.
    pub days: Option<u32>,
}

/// GET /api/v1/interventions/due?days=N
pub async fn list_due(
    State(state): State<AppState>,
    Query(params): Query<DueParams>,
) -> AppResult<impl IntoResponse> {
    let days = params.days.unwrap_or(state.config.dashboard.due_soon_days);
    let mut store = PgSchedulingStore::begin(&state.pool).await?;
    let items = window::list_due_within(&mut store, days, today()).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/interventions/overdue
pub async fn list_overdue(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut store = PgSchedulingStore::begin(&state.pool).await?;
    let items = window::list_overdue(&mut store, today()).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/interventions/current-week
pub async fn list_current_week(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut store = PgSchedulingStore::begin(&state.pool).await?;
    let items = window::list_current_week(&mut store, today()).await?;
    Ok(Json(DataResponse { data: items }))
}

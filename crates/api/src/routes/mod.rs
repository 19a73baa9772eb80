pub mod alerts;
pub mod contract;
pub mod dashboard;
pub mod health;
pub mod intervention;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /contracts/{id}/initial-plan                     generate initial plan (POST)
///
/// /interventions/{id}/complete                     complete (POST)
/// /interventions/{id}/postpone                     postpone (POST)
/// /interventions/{id}/schedule                     schedule (POST)
/// /interventions/{id}/cancel                       cancel (POST)
/// /interventions/due?days=N                        to schedule within N days
/// /interventions/overdue                           open and past their date
/// /interventions/current-week                      Monday to Sunday
///
/// /dashboard/stats                                 dashboard counters
///
/// /alerts/contracts-without-future-visit           active, nothing queued
/// /alerts/one-off-nearing-completion               one regular visit left
/// /alerts/contracts-past-end-date                  visits queued after end
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/contracts", contract::router())
        .nest("/interventions", intervention::router())
        .nest("/dashboard", dashboard::router())
        .nest("/alerts", alerts::router())
}

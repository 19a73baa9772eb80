//! Counters for the planning dashboard.

use chrono::NaiveDate;
use serde::Serialize;

use crate::alert;
use crate::error::CoreError;
use crate::status::{InterventionKind, InterventionStatus};
use crate::store::{InterventionFilter, SchedulingStore};
use crate::window::{due_within_filter, overdue_filter, DateWindow};

/// Default look-ahead of the "due soon" counter.
pub const DEFAULT_DUE_SOON_DAYS: u32 = 7;

/// Default look-ahead of the upcoming inspections counter.
pub const DEFAULT_INSPECTION_HORIZON_DAYS: u32 = 30;

/// Window sizes used by [`dashboard_stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub due_soon_days: u32,
    pub inspection_horizon_days: u32,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
            inspection_horizon_days: DEFAULT_INSPECTION_HORIZON_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub due_soon_count: i64,
    pub overdue_count: i64,
    pub upcoming_inspections_30d: i64,
    pub contracts_needing_attention_count: usize,
    pub one_off_almost_done_count: usize,
}

pub async fn dashboard_stats<S: SchedulingStore + ?Sized>(
    store: &mut S,
    today: NaiveDate,
    settings: &DashboardSettings,
) -> Result<DashboardStats, CoreError> {
    let due_soon_count = store
        .count_interventions(&due_within_filter(today, settings.due_soon_days))
        .await?;
    let overdue_count = store.count_interventions(&overdue_filter(today)).await?;

    let horizon = DateWindow::due_within(today, settings.inspection_horizon_days);
    let upcoming_inspections = InterventionFilter {
        kind: Some(InterventionKind::Inspection),
        ..InterventionFilter::default()
    }
    .excluding_statuses(InterventionStatus::TERMINAL)
    .planned_between(horizon.from, horizon.to);
    let upcoming_inspections_30d = store.count_interventions(&upcoming_inspections).await?;

    let contracts_needing_attention_count = alert::list_contracts_without_future_visit(store, today)
        .await?
        .len();
    let one_off_almost_done_count = alert::list_one_off_nearing_completion(store).await?.len();

    Ok(DashboardStats {
        due_soon_count,
        overdue_count,
        upcoming_inspections_30d,
        contracts_needing_attention_count,
        one_off_almost_done_count,
    })
}

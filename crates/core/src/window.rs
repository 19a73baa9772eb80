//! Date windows shared by the dashboard lists.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::error::CoreError;
use crate::model::Intervention;
use crate::status::InterventionStatus;
use crate::store::{InterventionFilter, SchedulingStore};

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    /// `[today, today + days]`.
    pub fn due_within(today: NaiveDate, days: u32) -> Self {
        Self {
            from: today,
            to: today
                .checked_add_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// Monday to Sunday of the week containing `today`.
    pub fn current_week(today: NaiveDate) -> Self {
        let offset = u64::from(today.weekday().num_days_from_monday());
        let from = today.checked_sub_days(Days::new(offset)).unwrap_or(today);
        let to = from.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Visits still to be scheduled within the next `days` days.
pub fn due_within_filter(today: NaiveDate, days: u32) -> InterventionFilter {
    let window = DateWindow::due_within(today, days);
    InterventionFilter::default()
        .with_statuses(&[InterventionStatus::ToSchedule])
        .planned_between(window.from, window.to)
}

/// Open visits whose planned date has passed.
pub fn overdue_filter(today: NaiveDate) -> InterventionFilter {
    InterventionFilter::default()
        .excluding_statuses(InterventionStatus::TERMINAL)
        .planned_before(today)
}

/// Every visit of the current week, whatever its status.
pub fn current_week_filter(today: NaiveDate) -> InterventionFilter {
    let window = DateWindow::current_week(today);
    InterventionFilter::default().planned_between(window.from, window.to)
}

pub async fn list_due_within<S: SchedulingStore + ?Sized>(
    store: &mut S,
    days: u32,
    today: NaiveDate,
) -> Result<Vec<Intervention>, CoreError> {
    store.list_interventions(&due_within_filter(today, days)).await
}

pub async fn list_overdue<S: SchedulingStore + ?Sized>(
    store: &mut S,
    today: NaiveDate,
) -> Result<Vec<Intervention>, CoreError> {
    store.list_interventions(&overdue_filter(today)).await
}

pub async fn list_current_week<S: SchedulingStore + ?Sized>(
    store: &mut S,
    today: NaiveDate,
) -> Result<Vec<Intervention>, CoreError> {
    store.list_interventions(&current_week_filter(today)).await
}

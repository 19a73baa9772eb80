//! Manual moves of a single visit: postpone, firm scheduling, cancellation.
//!
//! None of these touch the rest of the series.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use validator::Validate;

use crate::error::CoreError;
use crate::model::{append_note, Intervention, InterventionUpdate};
use crate::status::{state_machine, InterventionStatus};
use crate::store::{require_intervention, SchedulingStore};
use crate::types::{DbId, Timestamp};

/// Request payload of [`postpone`].
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostponeIntervention {
    pub new_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

/// Request payload of [`schedule`].
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleIntervention {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
}

/// Request payload of [`cancel`].
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CancelIntervention {
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

fn stamped(now: Timestamp, text: &str) -> String {
    format!("[{}] {text}", now.format("%Y-%m-%d %H:%M"))
}

async fn load_for_transition<S: SchedulingStore + ?Sized>(
    store: &mut S,
    id: DbId,
    to: InterventionStatus,
) -> Result<Intervention, CoreError> {
    let current = require_intervention(store, id).await?;
    state_machine::validate_transition(current.status, to).map_err(CoreError::InvalidState)?;
    Ok(current)
}

/// Move a visit to `new_date`, recording why.
///
/// Both the date and a non-blank reason are required.
pub async fn postpone<S: SchedulingStore + ?Sized>(
    store: &mut S,
    intervention_id: DbId,
    actor_id: DbId,
    input: &PostponeIntervention,
    now: Timestamp,
) -> Result<Intervention, CoreError> {
    let new_date = input
        .new_date
        .ok_or_else(|| CoreError::Validation("new_date is required".into()))?;
    let reason = input
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| CoreError::Validation("A postponement reason is required".into()))?;

    let current =
        load_for_transition(store, intervention_id, InterventionStatus::Postponed).await?;

    let line = stamped(
        now,
        &format!(
            "Postponed from {} to {new_date}: {reason}",
            current.planned_date
        ),
    );
    let updated = store
        .update_intervention(
            intervention_id,
            &InterventionUpdate {
                status: Some(InterventionStatus::Postponed),
                planned_date: Some(new_date),
                notes: Some(append_note(current.notes.as_deref(), &line)),
                updated_by: Some(actor_id),
                ..InterventionUpdate::default()
            },
        )
        .await?;

    tracing::info!(
        intervention_id,
        actor_id,
        from = %current.planned_date,
        to = %new_date,
        "Intervention postponed"
    );
    Ok(updated)
}

/// Fix the date (and optionally time) of a queued or postponed visit.
pub async fn schedule<S: SchedulingStore + ?Sized>(
    store: &mut S,
    intervention_id: DbId,
    actor_id: DbId,
    input: &ScheduleIntervention,
) -> Result<Intervention, CoreError> {
    load_for_transition(store, intervention_id, InterventionStatus::Scheduled).await?;

    let updated = store
        .update_intervention(
            intervention_id,
            &InterventionUpdate {
                status: Some(InterventionStatus::Scheduled),
                planned_date: Some(input.date),
                planned_time: input.time,
                updated_by: Some(actor_id),
                ..InterventionUpdate::default()
            },
        )
        .await?;

    tracing::info!(intervention_id, actor_id, date = %input.date, "Intervention scheduled");
    Ok(updated)
}

/// Cancel a visit that has not happened yet.
pub async fn cancel<S: SchedulingStore + ?Sized>(
    store: &mut S,
    intervention_id: DbId,
    actor_id: DbId,
    input: &CancelIntervention,
    now: Timestamp,
) -> Result<Intervention, CoreError> {
    let current =
        load_for_transition(store, intervention_id, InterventionStatus::Cancelled).await?;

    let notes = input
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|reason| {
            append_note(
                current.notes.as_deref(),
                &stamped(now, &format!("Cancelled: {reason}")),
            )
        });

    let updated = store
        .update_intervention(
            intervention_id,
            &InterventionUpdate {
                status: Some(InterventionStatus::Cancelled),
                notes,
                updated_by: Some(actor_id),
                ..InterventionUpdate::default()
            },
        )
        .await?;

    tracing::info!(intervention_id, actor_id, "Intervention cancelled");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn stamped_prefixes_minute_precision_timestamp() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 42).unwrap();
        assert_eq!(stamped(now, "hello"), "[2024-03-01 09:05] hello");
    }
}

//! Completion of a visit and the follow-up it triggers.
//!
//! Completing a visit on its actual date drives the rest of its series: the
//! next due date is computed from the actual date, later visits of the same
//! contract/site/kind are shifted by the gap between plan and reality, and
//! the next visit is either retargeted or created.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::frequency::resolve_rule;
use crate::model::{append_note, Contract, Intervention, InterventionUpdate, NewIntervention};
use crate::planning::effective_max_count;
use crate::status::{state_machine, ContractKind, InterventionKind, InterventionStatus};
use crate::store::{require_contract, require_intervention, InterventionFilter, SchedulingStore};
use crate::types::DbId;

/// Request payload of [`complete_intervention`].
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CompleteIntervention {
    /// Day the visit actually took place. Defaults to its planned date.
    pub actual_date: Option<NaiveDate>,
    /// Create or retarget the follow-up even when the contract does not
    /// do so automatically.
    pub create_next: Option<bool>,
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}

/// A later visit moved by the retroactive shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftedIntervention {
    pub id: DbId,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    pub intervention: Intervention,
    pub next_created: bool,
    pub next_intervention: Option<Intervention>,
    pub suggested_date: Option<NaiveDate>,
    /// Regular visits still open on a one-off contract.
    pub operations_remaining: Option<i64>,
    pub shifted: Vec<ShiftedIntervention>,
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// Days between the planned and the actual date. `None` when equal.
pub fn shift_delta(planned_before: NaiveDate, effective: NaiveDate) -> Option<i64> {
    let days = (effective - planned_before).num_days();
    (days != 0).then_some(days)
}

/// What to do with the next visit of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// An existing future visit already sits on the suggested date.
    Keep { id: DbId },
    /// Move an existing future visit to the suggested date.
    Retarget { id: DbId, to: NaiveDate },
    /// Create a new visit on this date.
    Create { on: NaiveDate },
    /// The series already holds its maximum number of visits.
    CeilingReached,
}

/// Decide the follow-up of a completed visit.
///
/// An existing future visit of the same service is always reused. Otherwise
/// a new one is created unless `series_count` (non-cancelled visits of that
/// service in the series) has reached `max_count`.
pub fn plan_follow_up(
    existing_next: Option<&Intervention>,
    suggested: NaiveDate,
    max_count: Option<i32>,
    series_count: i64,
) -> FollowUp {
    if let Some(next) = existing_next {
        return if next.planned_date == suggested {
            FollowUp::Keep { id: next.id }
        } else {
            FollowUp::Retarget {
                id: next.id,
                to: suggested,
            }
        };
    }

    match max_count {
        Some(max) if series_count >= i64::from(max) => FollowUp::CeilingReached,
        _ => FollowUp::Create { on: suggested },
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// Mark a visit as done and schedule what follows it.
///
/// Fails with `NotFound` when the visit (or its contract) does not exist and
/// with `InvalidState` when it is already done or cancelled.
pub async fn complete_intervention<S: SchedulingStore + ?Sized>(
    store: &mut S,
    intervention_id: DbId,
    actor_id: DbId,
    input: &CompleteIntervention,
) -> Result<CompletionOutcome, CoreError> {
    let mut current = require_intervention(store, intervention_id).await?;
    if let Some(contract_id) = current.contract_id {
        store.lock_contract(contract_id).await?;
        // Reload under the lock; a concurrent call may have completed it.
        current = require_intervention(store, intervention_id).await?;
    }

    state_machine::validate_transition(current.status, InterventionStatus::Done)
        .map_err(CoreError::InvalidState)?;

    let planned_before = current.planned_date;
    let effective = input.actual_date.unwrap_or(planned_before);

    let notes = input
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| append_note(current.notes.as_deref(), n));

    let done = store
        .update_intervention(
            intervention_id,
            &InterventionUpdate {
                status: Some(InterventionStatus::Done),
                planned_date: Some(effective),
                completed_on: Some(effective),
                completed_by: Some(actor_id),
                notes,
                updated_by: Some(actor_id),
                ..InterventionUpdate::default()
            },
        )
        .await?;

    let mut outcome = CompletionOutcome {
        intervention: done,
        next_created: false,
        next_intervention: None,
        suggested_date: None,
        operations_remaining: None,
        shifted: Vec::new(),
    };

    let Some(contract_id) = outcome.intervention.contract_id else {
        return Ok(outcome);
    };
    if !outcome.intervention.kind.drives_recurrence() {
        return Ok(outcome);
    }
    let contract = require_contract(store, contract_id).await?;

    follow_up(
        store,
        &contract,
        planned_before,
        effective,
        input.create_next.unwrap_or(false),
        &mut outcome,
    )
    .await?;

    if contract.kind == ContractKind::OneOff {
        let open_regular = InterventionFilter {
            contract_id: Some(contract.id),
            kind: Some(InterventionKind::Regular),
            ..InterventionFilter::default()
        }
        .excluding_statuses(InterventionStatus::TERMINAL);
        outcome.operations_remaining = Some(store.count_interventions(&open_regular).await?);
    }

    tracing::info!(
        intervention_id,
        contract_id,
        actor_id,
        %effective,
        next_created = outcome.next_created,
        shifted = outcome.shifted.len(),
        "Intervention completed"
    );

    Ok(outcome)
}

async fn follow_up<S: SchedulingStore + ?Sized>(
    store: &mut S,
    contract: &Contract,
    planned_before: NaiveDate,
    effective: NaiveDate,
    create_next: bool,
    outcome: &mut CompletionOutcome,
) -> Result<(), CoreError> {
    let done = &outcome.intervention;
    let (site_id, kind) = (done.site_id, done.kind);
    let service = done.service_label.clone();

    let rule = resolve_rule(contract, kind, site_id);
    let Some(recurrence) = rule.recurrence() else {
        tracing::debug!(contract_id = contract.id, ?kind, "No frequency, no follow-up");
        return Ok(());
    };
    let Some(suggested) = recurrence.next_after(effective) else {
        return Ok(());
    };
    outcome.suggested_date = Some(suggested);

    if !contract.auto_create_next && !create_next {
        return Ok(());
    }

    let open_series = InterventionFilter::series(contract.id, site_id, kind)
        .excluding_statuses(InterventionStatus::TERMINAL)
        .excluding(done.id);

    if let Some(delta) = shift_delta(planned_before, effective) {
        let later = store
            .list_interventions(&open_series.clone().planned_after(planned_before))
            .await?;
        for visit in later {
            let Some(to) = visit.planned_date.checked_add_signed(Duration::days(delta)) else {
                continue;
            };
            store
                .update_intervention(visit.id, &InterventionUpdate::planned_on(to))
                .await?;
            outcome.shifted.push(ShiftedIntervention {
                id: visit.id,
                from: visit.planned_date,
                to,
            });
        }
    }

    // Each service of a scope runs its own chain of visits.
    let existing_next = store
        .list_interventions(&open_series.planned_after(effective))
        .await?
        .into_iter()
        .find(|v| v.service_label == service);

    let max_count = effective_max_count(contract, &rule);
    let series_count = match (&existing_next, max_count) {
        (None, Some(_)) => {
            let filter = InterventionFilter::series(contract.id, site_id, kind)
                .excluding_statuses(&[InterventionStatus::Cancelled]);
            let kept = store.list_interventions(&filter).await?;
            kept.iter().filter(|v| v.service_label == service).count() as i64
        }
        _ => 0,
    };

    match plan_follow_up(existing_next.as_ref(), suggested, max_count, series_count) {
        FollowUp::Keep { .. } => {
            outcome.next_intervention = existing_next;
        }
        FollowUp::Retarget { id, to } => {
            let moved = store
                .update_intervention(id, &InterventionUpdate::planned_on(to))
                .await?;
            outcome.next_intervention = Some(moved);
        }
        FollowUp::Create { on } => {
            let done = &outcome.intervention;
            let new = NewIntervention {
                contract_id: Some(contract.id),
                client_id: done.client_id,
                site_id,
                kind,
                status: InterventionStatus::ToSchedule,
                planned_date: on,
                planned_time: done.planned_time,
                duration_minutes: done.duration_minutes,
                service_label: done.service_label.clone(),
            };
            let created = store.create_interventions(&[new]).await?;
            outcome.next_created = !created.is_empty();
            outcome.next_intervention = created.into_iter().next();
        }
        FollowUp::CeilingReached => {
            tracing::info!(
                contract_id = contract.id,
                ?site_id,
                ?kind,
                max_count,
                "Visit count ceiling reached, no follow-up created"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn visit(id: DbId, planned: NaiveDate) -> Intervention {
        Intervention {
            id,
            contract_id: Some(1),
            client_id: 10,
            site_id: None,
            kind: InterventionKind::Regular,
            status: InterventionStatus::ToSchedule,
            planned_date: planned,
            planned_time: None,
            duration_minutes: None,
            service_label: None,
            completed_on: None,
            completed_by: None,
            notes: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn delta_is_signed_day_count() {
        assert_eq!(shift_delta(d(2024, 3, 15), d(2024, 3, 20)), Some(5));
        assert_eq!(shift_delta(d(2024, 3, 15), d(2024, 3, 12)), Some(-3));
        assert_eq!(shift_delta(d(2024, 3, 15), d(2024, 3, 15)), None);
    }

    #[test]
    fn existing_visit_on_suggested_date_is_kept() {
        let next = visit(4, d(2024, 4, 20));
        assert_eq!(
            plan_follow_up(Some(&next), d(2024, 4, 20), Some(1), 99),
            FollowUp::Keep { id: 4 }
        );
    }

    #[test]
    fn existing_visit_is_retargeted_even_at_ceiling() {
        let next = visit(4, d(2024, 4, 15));
        assert_eq!(
            plan_follow_up(Some(&next), d(2024, 4, 20), Some(1), 5),
            FollowUp::Retarget {
                id: 4,
                to: d(2024, 4, 20)
            }
        );
    }

    #[test]
    fn creates_below_ceiling() {
        assert_eq!(
            plan_follow_up(None, d(2024, 4, 20), Some(3), 2),
            FollowUp::Create { on: d(2024, 4, 20) }
        );
        assert_eq!(
            plan_follow_up(None, d(2024, 4, 20), None, 1000),
            FollowUp::Create { on: d(2024, 4, 20) }
        );
    }

    #[test]
    fn ceiling_blocks_creation() {
        assert_eq!(
            plan_follow_up(None, d(2024, 4, 20), Some(3), 3),
            FollowUp::CeilingReached
        );
    }

    #[test]
    fn notes_are_length_limited() {
        let input = CompleteIntervention {
            notes: Some("x".repeat(4001)),
            ..CompleteIntervention::default()
        };
        assert!(input.validate().is_err());
    }
}

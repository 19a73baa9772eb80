//! Initial visit calendar of a newly activated contract.
//!
//! [`expand_plan`] is pure: it turns a contract (with its site overrides)
//! into the list of visits to create. [`generate_initial_plan`] loads the
//! contract, checks it may be planned and writes the result through the
//! store.

use chrono::{Months, NaiveDate};
use serde::Serialize;

use crate::error::CoreError;
use crate::frequency::{resolve_rule, resolve_services, ResolvedRule};
use crate::model::{Contract, Intervention, NewIntervention};
use crate::recurrence::Recurrence;
use crate::status::{ContractKind, InterventionKind, InterventionStatus};
use crate::store::{require_contract, InterventionFilter, SchedulingStore};
use crate::types::DbId;

/// Hard stop on the number of occurrences generated for one series.
pub const MAX_OCCURRENCES_PER_SERIES: usize = 520;

/// Occurrence count of a one-off contract that sets no explicit count.
pub const DEFAULT_ONE_OFF_COUNT: i32 = 1;

/// Planning horizon of a running contract without an end date.
pub const DEFAULT_HORIZON_MONTHS: u32 = 12;

/// How a series of occurrences terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesBound {
    /// Exactly this many occurrences.
    Count(usize),
    /// Every occurrence on or before this date.
    Until(NaiveDate),
}

/// Total visit count a series may hold, if it is bounded by count.
///
/// An explicit maximum wins; a one-off contract without one gets
/// [`DEFAULT_ONE_OFF_COUNT`]. Completion applies the same ceiling.
pub fn effective_max_count(contract: &Contract, rule: &ResolvedRule) -> Option<i32> {
    match (rule.max_count, contract.kind) {
        (Some(count), _) => Some(count),
        (None, ContractKind::OneOff) => Some(DEFAULT_ONE_OFF_COUNT),
        (None, ContractKind::Recurring) => None,
    }
}

/// Termination rule of one series.
///
/// Counted when a maximum count resolves or the contract is one-off;
/// otherwise bounded by the contract end date, or by the default horizon
/// from `today` when the contract has none.
pub fn series_bound(contract: &Contract, rule: &ResolvedRule, today: NaiveDate) -> SeriesBound {
    match effective_max_count(contract, rule) {
        Some(count) => SeriesBound::Count(usize::try_from(count).unwrap_or(0)),
        None => SeriesBound::Until(contract.end_date.unwrap_or_else(|| {
            today
                .checked_add_months(Months::new(DEFAULT_HORIZON_MONTHS))
                .unwrap_or(NaiveDate::MAX)
        })),
    }
}

/// Dates of a series starting at `first`, capped at
/// [`MAX_OCCURRENCES_PER_SERIES`].
pub fn occurrence_dates(
    first: NaiveDate,
    recurrence: Recurrence,
    bound: SeriesBound,
) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut next = Some(first);

    while let Some(date) = next {
        let within = match bound {
            SeriesBound::Count(count) => dates.len() < count,
            SeriesBound::Until(last) => date <= last,
        };
        if !within || dates.len() >= MAX_OCCURRENCES_PER_SERIES {
            break;
        }
        dates.push(date);
        next = recurrence.next_after(date);
    }

    dates
}

/// Every visit the initial plan of `contract` consists of.
///
/// One scope per site override, or a single site-less scope when the
/// contract has none. Regular visits are duplicated per service; inspection
/// visits are created once per occurrence.
pub fn expand_plan(contract: &Contract, today: NaiveDate) -> Vec<NewIntervention> {
    let scopes: Vec<Option<DbId>> = if contract.sites.is_empty() {
        vec![None]
    } else {
        contract.sites.iter().map(|s| Some(s.site_id)).collect()
    };

    let mut planned = Vec::new();
    for site_id in scopes {
        for kind in InterventionKind::RECURRING {
            let rule = resolve_rule(contract, *kind, site_id);
            let Some(recurrence) = rule.recurrence() else {
                continue;
            };
            let first = rule.first_date.unwrap_or(contract.start_date);
            let bound = series_bound(contract, &rule, today);

            let labels: Vec<Option<String>> = match kind {
                InterventionKind::Regular => {
                    let services = resolve_services(contract, site_id);
                    if services.is_empty() {
                        vec![None]
                    } else {
                        services.iter().cloned().map(Some).collect()
                    }
                }
                _ => vec![None],
            };

            for date in occurrence_dates(first, recurrence, bound) {
                for label in &labels {
                    planned.push(NewIntervention {
                        contract_id: Some(contract.id),
                        client_id: contract.client_id,
                        site_id,
                        kind: *kind,
                        status: InterventionStatus::ToSchedule,
                        planned_date: date,
                        planned_time: contract.default_planned_time,
                        duration_minutes: contract.default_duration_minutes,
                        service_label: label.clone(),
                    });
                }
            }
        }
    }

    planned
}

/// Result of [`generate_initial_plan`].
#[derive(Debug, Clone, Serialize)]
pub struct InitialPlan {
    pub contract: Contract,
    pub created: Vec<Intervention>,
    pub count: usize,
}

/// Create the initial calendar of an active contract.
///
/// Fails with `NotFound` when the contract does not exist and with
/// `InvalidState` when it is not active or already has visits.
pub async fn generate_initial_plan<S: SchedulingStore + ?Sized>(
    store: &mut S,
    contract_id: DbId,
    today: NaiveDate,
) -> Result<InitialPlan, CoreError> {
    let contract = require_contract(store, contract_id).await?;
    if !contract.is_active() {
        return Err(CoreError::InvalidState(format!(
            "Contract {contract_id} is not active; only active contracts can be planned"
        )));
    }
    store.lock_contract(contract_id).await?;

    let existing = store
        .count_interventions(&InterventionFilter {
            contract_id: Some(contract_id),
            ..InterventionFilter::default()
        })
        .await?;
    if existing > 0 {
        return Err(CoreError::InvalidState(format!(
            "Contract {contract_id} already has {existing} visits; its initial plan exists"
        )));
    }

    let planned = expand_plan(&contract, today);
    let created = if planned.is_empty() {
        Vec::new()
    } else {
        store.create_interventions(&planned).await?
    };

    tracing::info!(
        contract_id,
        sites = contract.sites.len(),
        created = created.len(),
        "Initial plan generated"
    );

    let count = created.len();
    Ok(InitialPlan {
        contract,
        created,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContractSite, RuleSettings};
    use crate::recurrence::Frequency;
    use crate::status::ContractStatus;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn contract(kind: ContractKind) -> Contract {
        Contract {
            id: 1,
            client_id: 10,
            kind,
            status: ContractStatus::Active,
            start_date: d(2024, 1, 1),
            end_date: None,
            services: vec!["deratting".into()],
            regular: RuleSettings {
                frequency: Some(Frequency::Monthly),
                first_date: Some(d(2024, 1, 15)),
                ..RuleSettings::default()
            },
            inspection: RuleSettings::default(),
            default_planned_time: None,
            default_duration_minutes: Some(45),
            auto_create_next: true,
            sites: Vec::new(),
        }
    }

    #[test]
    fn count_bound_stops_exactly() {
        let rule = Recurrence::new(Frequency::Weekly, None);
        let dates = occurrence_dates(d(2024, 1, 1), rule, SeriesBound::Count(3));
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 8), d(2024, 1, 15)]);
    }

    #[test]
    fn zero_count_yields_nothing() {
        let rule = Recurrence::new(Frequency::Weekly, None);
        assert!(occurrence_dates(d(2024, 1, 1), rule, SeriesBound::Count(0)).is_empty());
    }

    #[test]
    fn until_bound_is_inclusive() {
        let rule = Recurrence::new(Frequency::Monthly, None);
        let dates = occurrence_dates(d(2024, 1, 15), rule, SeriesBound::Until(d(2024, 3, 15)));
        assert_eq!(dates.len(), 3);
        assert_eq!(dates.last(), Some(&d(2024, 3, 15)));
    }

    #[test]
    fn first_date_after_bound_yields_nothing() {
        let rule = Recurrence::new(Frequency::Monthly, None);
        let dates = occurrence_dates(d(2024, 7, 1), rule, SeriesBound::Until(d(2024, 6, 30)));
        assert!(dates.is_empty());
    }

    #[test]
    fn occurrences_are_capped() {
        let rule = Recurrence::new(Frequency::Weekly, Some(1));
        let dates = occurrence_dates(d(2024, 1, 1), rule, SeriesBound::Until(d(2030, 1, 1)));
        assert_eq!(dates.len(), MAX_OCCURRENCES_PER_SERIES);
    }

    #[test]
    fn one_off_without_count_defaults_to_one() {
        let c = contract(ContractKind::OneOff);
        let rule = resolve_rule(&c, InterventionKind::Regular, None);
        assert_eq!(series_bound(&c, &rule, d(2024, 1, 1)), SeriesBound::Count(1));
        assert_eq!(effective_max_count(&c, &rule), Some(DEFAULT_ONE_OFF_COUNT));
        let recurring = contract(ContractKind::Recurring);
        assert_eq!(effective_max_count(&recurring, &rule), None);
    }

    #[test]
    fn recurring_without_end_date_plans_one_year() {
        let c = contract(ContractKind::Recurring);
        let rule = resolve_rule(&c, InterventionKind::Regular, None);
        assert_eq!(
            series_bound(&c, &rule, d(2024, 1, 10)),
            SeriesBound::Until(d(2025, 1, 10))
        );
    }

    #[test]
    fn monthly_plan_clamped_to_end_date() {
        let mut c = contract(ContractKind::Recurring);
        c.end_date = Some(d(2024, 6, 30));

        let planned = expand_plan(&c, d(2024, 1, 1));
        let dates: Vec<_> = planned.iter().map(|p| p.planned_date).collect();
        assert_eq!(
            dates,
            vec![
                d(2024, 1, 15),
                d(2024, 2, 15),
                d(2024, 3, 15),
                d(2024, 4, 15),
                d(2024, 5, 15),
                d(2024, 6, 15),
            ]
        );
        assert!(planned
            .iter()
            .all(|p| p.status == InterventionStatus::ToSchedule
                && p.kind == InterventionKind::Regular
                && p.duration_minutes == Some(45)));
    }

    #[test]
    fn one_off_count_three_per_service() {
        let mut c = contract(ContractKind::OneOff);
        c.services = vec!["deratting".into(), "disinsection".into()];
        c.regular.max_count = Some(3);

        let planned = expand_plan(&c, d(2024, 1, 1));
        assert_eq!(planned.len(), 6);
        for service in ["deratting", "disinsection"] {
            let count = planned
                .iter()
                .filter(|p| p.service_label.as_deref() == Some(service))
                .count();
            assert_eq!(count, 3);
        }
    }

    #[test]
    fn inspections_are_not_duplicated_per_service() {
        let mut c = contract(ContractKind::OneOff);
        c.services = vec!["a".into(), "b".into()];
        c.regular.frequency = None;
        c.inspection = RuleSettings {
            frequency: Some(Frequency::Quarterly),
            max_count: Some(2),
            ..RuleSettings::default()
        };

        let planned = expand_plan(&c, d(2024, 1, 1));
        assert_eq!(planned.len(), 2);
        assert!(planned
            .iter()
            .all(|p| p.kind == InterventionKind::Inspection && p.service_label.is_none()));
        // No inspection first date: starts on the contract start date.
        assert_eq!(planned[0].planned_date, d(2024, 1, 1));
        assert_eq!(planned[1].planned_date, d(2024, 4, 1));
    }

    #[test]
    fn empty_service_list_yields_unlabelled_visits() {
        let mut c = contract(ContractKind::OneOff);
        c.services.clear();
        let planned = expand_plan(&c, d(2024, 1, 1));
        assert_eq!(planned.len(), 1);
        assert!(planned[0].service_label.is_none());
    }

    #[test]
    fn one_scope_per_site_override() {
        let mut c = contract(ContractKind::OneOff);
        c.regular.max_count = Some(2);
        for site_id in [7, 8] {
            c.sites.push(ContractSite {
                id: site_id,
                contract_id: 1,
                site_id,
                services: None,
                regular: RuleSettings::default(),
                inspection: RuleSettings::default(),
            });
        }

        let planned = expand_plan(&c, d(2024, 1, 1));
        assert_eq!(planned.len(), 4);
        assert_eq!(planned.iter().filter(|p| p.site_id == Some(7)).count(), 2);
        assert_eq!(planned.iter().filter(|p| p.site_id == Some(8)).count(), 2);
        assert!(planned.iter().all(|p| p.site_id.is_some()));
    }

    #[test]
    fn kind_without_frequency_is_skipped() {
        let mut c = contract(ContractKind::Recurring);
        c.regular.frequency = None;
        assert!(expand_plan(&c, d(2024, 1, 1)).is_empty());
    }
}

//! Anti-forgetting alerts: contracts at risk of being silently dropped.
//!
//! Each alert is a pure function over contracts and visits, fed by a
//! read-only store query.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CoreError;
use crate::model::{Contract, Intervention};
use crate::status::{ContractKind, ContractStatus, InterventionKind, InterventionStatus};
use crate::store::{ContractFilter, InterventionFilter, SchedulingStore};
use crate::types::DbId;

/// An active contract with nothing queued from today on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractWithoutFutureVisit {
    pub contract_id: DbId,
    pub client_id: DbId,
    pub kind: ContractKind,
    pub end_date: Option<NaiveDate>,
}

/// A one-off contract with a single regular visit left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OneOffNearingCompletion {
    pub contract_id: DbId,
    pub client_id: DbId,
    pub remaining: usize,
}

/// A running contract with visits queued after its own end date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractPastEndDate {
    pub contract_id: DbId,
    pub client_id: DbId,
    pub end_date: NaiveDate,
    pub count: usize,
    pub earliest: NaiveDate,
}

// ---------------------------------------------------------------------------
// Pure detection
// ---------------------------------------------------------------------------

/// Active contracts with no queued visit planned on or after `today`.
pub fn contracts_without_future_visit(
    contracts: &[Contract],
    queued: &[Intervention],
    today: NaiveDate,
) -> Vec<ContractWithoutFutureVisit> {
    let covered: HashSet<DbId> = queued
        .iter()
        .filter(|i| InterventionStatus::QUEUED.contains(&i.status) && i.planned_date >= today)
        .filter_map(|i| i.contract_id)
        .collect();

    contracts
        .iter()
        .filter(|c| c.is_active() && !covered.contains(&c.id))
        .map(|c| ContractWithoutFutureVisit {
            contract_id: c.id,
            client_id: c.client_id,
            kind: c.kind,
            end_date: c.end_date,
        })
        .collect()
}

/// Active one-off contracts whose open regular visits number exactly one.
pub fn one_off_nearing_completion(
    contracts: &[Contract],
    open_regular: &[Intervention],
) -> Vec<OneOffNearingCompletion> {
    let mut remaining: HashMap<DbId, usize> = HashMap::new();
    for visit in open_regular {
        if visit.kind != InterventionKind::Regular || visit.status.is_terminal() {
            continue;
        }
        if let Some(contract_id) = visit.contract_id {
            *remaining.entry(contract_id).or_default() += 1;
        }
    }

    contracts
        .iter()
        .filter(|c| c.is_active() && c.kind == ContractKind::OneOff)
        .filter(|c| remaining.get(&c.id) == Some(&1))
        .map(|c| OneOffNearingCompletion {
            contract_id: c.id,
            client_id: c.client_id,
            remaining: 1,
        })
        .collect()
}

/// Recurring contracts with queued visits after their end date, ordered by
/// contract id.
pub fn contracts_past_end_date(
    contracts: &[Contract],
    queued: &[Intervention],
) -> Vec<ContractPastEndDate> {
    let bounded: HashMap<DbId, (&Contract, NaiveDate)> = contracts
        .iter()
        .filter(|c| c.kind == ContractKind::Recurring)
        .filter_map(|c| c.end_date.map(|end| (c.id, (c, end))))
        .collect();

    let mut alerts: BTreeMap<DbId, ContractPastEndDate> = BTreeMap::new();
    for visit in queued {
        if !InterventionStatus::QUEUED.contains(&visit.status) {
            continue;
        }
        let Some((contract, end_date)) = visit.contract_id.and_then(|id| bounded.get(&id)) else {
            continue;
        };
        if visit.planned_date <= *end_date {
            continue;
        }
        alerts
            .entry(contract.id)
            .and_modify(|a| {
                a.count += 1;
                a.earliest = a.earliest.min(visit.planned_date);
            })
            .or_insert(ContractPastEndDate {
                contract_id: contract.id,
                client_id: contract.client_id,
                end_date: *end_date,
                count: 1,
                earliest: visit.planned_date,
            });
    }

    alerts.into_values().collect()
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

fn queued_contract_visits() -> InterventionFilter {
    InterventionFilter {
        has_contract: true,
        ..InterventionFilter::default()
    }
    .with_statuses(InterventionStatus::QUEUED)
}

pub async fn list_contracts_without_future_visit<S: SchedulingStore + ?Sized>(
    store: &mut S,
    today: NaiveDate,
) -> Result<Vec<ContractWithoutFutureVisit>, CoreError> {
    let contracts = store
        .list_contracts(&ContractFilter {
            status: Some(ContractStatus::Active),
            ..ContractFilter::default()
        })
        .await?;
    let queued = store
        .list_interventions(&queued_contract_visits().planned_between(today, NaiveDate::MAX))
        .await?;
    Ok(contracts_without_future_visit(&contracts, &queued, today))
}

pub async fn list_one_off_nearing_completion<S: SchedulingStore + ?Sized>(
    store: &mut S,
) -> Result<Vec<OneOffNearingCompletion>, CoreError> {
    let contracts = store
        .list_contracts(&ContractFilter {
            status: Some(ContractStatus::Active),
            kind: Some(ContractKind::OneOff),
            ..ContractFilter::default()
        })
        .await?;
    let open_regular = store
        .list_interventions(
            &InterventionFilter {
                has_contract: true,
                kind: Some(InterventionKind::Regular),
                ..InterventionFilter::default()
            }
            .excluding_statuses(InterventionStatus::TERMINAL),
        )
        .await?;
    Ok(one_off_nearing_completion(&contracts, &open_regular))
}

pub async fn list_contracts_past_end_date<S: SchedulingStore + ?Sized>(
    store: &mut S,
) -> Result<Vec<ContractPastEndDate>, CoreError> {
    let contracts = store
        .list_contracts(&ContractFilter {
            kind: Some(ContractKind::Recurring),
            has_end_date: true,
            ..ContractFilter::default()
        })
        .await?;
    let queued = store.list_interventions(&queued_contract_visits()).await?;
    Ok(contracts_past_end_date(&contracts, &queued))
}

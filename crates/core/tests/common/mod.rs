//! In-memory scheduling store and fixtures shared by the engine tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use sentinelle_core::error::CoreError;
use sentinelle_core::model::{
    Contract, ContractSite, Intervention, InterventionUpdate, NewIntervention, RuleSettings,
};
use sentinelle_core::recurrence::Frequency;
use sentinelle_core::status::{ContractKind, ContractStatus, InterventionKind, InterventionStatus};
use sentinelle_core::store::{ContractFilter, InterventionFilter, SchedulingStore};
use sentinelle_core::types::DbId;

pub const ACTOR: DbId = 42;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub contracts: BTreeMap<DbId, Contract>,
    pub interventions: BTreeMap<DbId, Intervention>,
    /// Contract ids locked during the current unit of work, in call order.
    pub locks: Vec<DbId>,
    next_id: DbId,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_contract(&mut self, contract: Contract) {
        self.contracts.insert(contract.id, contract);
    }

    /// Insert a visit directly, bypassing the engine. Returns its id.
    pub fn seed(&mut self, new: NewIntervention) -> DbId {
        self.insert(&new).id
    }

    pub fn get(&self, id: DbId) -> &Intervention {
        &self.interventions[&id]
    }

    /// All visits matching `filter`, ordered like the store trait requires.
    pub fn matching(&self, filter: &InterventionFilter) -> Vec<Intervention> {
        let mut found: Vec<_> = self
            .interventions
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        found.sort_by_key(|i| (i.planned_date, i.id));
        found
    }

    fn insert(&mut self, new: &NewIntervention) -> Intervention {
        self.next_id += 1;
        let now = Utc::now();
        let row = Intervention {
            id: self.next_id,
            contract_id: new.contract_id,
            client_id: new.client_id,
            site_id: new.site_id,
            kind: new.kind,
            status: new.status,
            planned_date: new.planned_date,
            planned_time: new.planned_time,
            duration_minutes: new.duration_minutes,
            service_label: new.service_label.clone(),
            completed_on: None,
            completed_by: None,
            notes: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };
        self.interventions.insert(row.id, row.clone());
        row
    }
}

#[async_trait]
impl SchedulingStore for InMemoryStore {
    async fn find_contract(&mut self, id: DbId) -> Result<Option<Contract>, CoreError> {
        Ok(self.contracts.get(&id).cloned())
    }

    async fn list_contracts(&mut self, filter: &ContractFilter) -> Result<Vec<Contract>, CoreError> {
        Ok(self
            .contracts
            .values()
            .filter(|c| filter.matches(c))
            .map(|c| Contract {
                sites: Vec::new(),
                ..c.clone()
            })
            .collect())
    }

    async fn lock_contract(&mut self, id: DbId) -> Result<(), CoreError> {
        if !self.contracts.contains_key(&id) {
            return Err(CoreError::not_found("Contract", id));
        }
        self.locks.push(id);
        Ok(())
    }

    async fn find_intervention(&mut self, id: DbId) -> Result<Option<Intervention>, CoreError> {
        Ok(self.interventions.get(&id).cloned())
    }

    async fn list_interventions(
        &mut self,
        filter: &InterventionFilter,
    ) -> Result<Vec<Intervention>, CoreError> {
        Ok(self.matching(filter))
    }

    async fn count_interventions(&mut self, filter: &InterventionFilter) -> Result<i64, CoreError> {
        Ok(self.matching(filter).len() as i64)
    }

    async fn create_interventions(
        &mut self,
        items: &[NewIntervention],
    ) -> Result<Vec<Intervention>, CoreError> {
        Ok(items.iter().map(|new| self.insert(new)).collect())
    }

    async fn update_intervention(
        &mut self,
        id: DbId,
        update: &InterventionUpdate,
    ) -> Result<Intervention, CoreError> {
        let row = self
            .interventions
            .get_mut(&id)
            .ok_or(CoreError::not_found("Intervention", id))?;
        if let Some(status) = update.status {
            row.status = status;
        }
        if let Some(date) = update.planned_date {
            row.planned_date = date;
        }
        if let Some(time) = update.planned_time {
            row.planned_time = Some(time);
        }
        if let Some(date) = update.completed_on {
            row.completed_on = Some(date);
        }
        if let Some(actor) = update.completed_by {
            row.completed_by = Some(actor);
        }
        if let Some(notes) = &update.notes {
            row.notes = Some(notes.clone());
        }
        if let Some(actor) = update.updated_by {
            row.updated_by = Some(actor);
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn rule(frequency: Frequency) -> RuleSettings {
    RuleSettings {
        frequency: Some(frequency),
        ..RuleSettings::default()
    }
}

/// Active recurring contract with a monthly regular rule and no inspections.
pub fn monthly_contract(id: DbId) -> Contract {
    Contract {
        id,
        client_id: 100 + id,
        kind: ContractKind::Recurring,
        status: ContractStatus::Active,
        start_date: d(2024, 1, 15),
        end_date: Some(d(2024, 6, 30)),
        services: Vec::new(),
        regular: rule(Frequency::Monthly),
        inspection: RuleSettings::default(),
        default_planned_time: None,
        default_duration_minutes: None,
        auto_create_next: true,
        sites: Vec::new(),
    }
}

pub fn one_off_contract(id: DbId, max_count: i32) -> Contract {
    Contract {
        kind: ContractKind::OneOff,
        end_date: None,
        regular: RuleSettings {
            max_count: Some(max_count),
            ..rule(Frequency::Monthly)
        },
        ..monthly_contract(id)
    }
}

pub fn site(contract_id: DbId, site_id: DbId, regular: RuleSettings) -> ContractSite {
    ContractSite {
        id: site_id * 10,
        contract_id,
        site_id,
        services: None,
        regular,
        inspection: RuleSettings::default(),
    }
}

/// A queued visit of `contract`'s site-less regular series.
pub fn queued(contract: &Contract, planned: NaiveDate) -> NewIntervention {
    NewIntervention {
        contract_id: Some(contract.id),
        client_id: contract.client_id,
        site_id: None,
        kind: InterventionKind::Regular,
        status: InterventionStatus::ToSchedule,
        planned_date: planned,
        planned_time: None,
        duration_minutes: None,
        service_label: None,
    }
}

pub fn with_status(mut new: NewIntervention, status: InterventionStatus) -> NewIntervention {
    new.status = status;
    new
}

//! Domain entities the scheduling engine reads and writes.
//!
//! Contracts and their site overrides are owned by the surrounding CRUD
//! layer and only read here. Interventions are the engine's output.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::recurrence::Frequency;
use crate::status::{ContractKind, ContractStatus, InterventionKind, InterventionStatus};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Recurrence settings
// ---------------------------------------------------------------------------

/// Recurrence settings for one visit kind, at contract or site level.
///
/// At site level every field is optional and unset fields fall back to the
/// contract (see [`crate::frequency`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RuleSettings {
    pub frequency: Option<Frequency>,
    pub custom_days: Option<i32>,
    pub max_count: Option<i32>,
    pub first_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Contract {
    pub id: DbId,
    pub client_id: DbId,
    pub kind: ContractKind,
    pub status: ContractStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub services: Vec<String>,
    pub regular: RuleSettings,
    pub inspection: RuleSettings,
    pub default_planned_time: Option<NaiveTime>,
    pub default_duration_minutes: Option<i32>,
    pub auto_create_next: bool,
    /// Per-site overrides. Only loaded by single-contract lookups.
    pub sites: Vec<ContractSite>,
}

impl Contract {
    pub fn is_active(&self) -> bool {
        self.status == ContractStatus::Active
    }

    /// The override attached to `site_id`, if any.
    pub fn site(&self, site_id: DbId) -> Option<&ContractSite> {
        self.sites.iter().find(|s| s.site_id == site_id)
    }

    /// Contract-level settings for a recurring kind. `None` for
    /// out-of-contract kinds.
    pub fn settings(&self, kind: InterventionKind) -> Option<&RuleSettings> {
        match kind {
            InterventionKind::Regular => Some(&self.regular),
            InterventionKind::Inspection => Some(&self.inspection),
            _ => None,
        }
    }
}

/// Per-site override of a contract's recurrence rules.
#[derive(Debug, Clone, Serialize)]
pub struct ContractSite {
    pub id: DbId,
    pub contract_id: DbId,
    pub site_id: DbId,
    pub services: Option<Vec<String>>,
    pub regular: RuleSettings,
    pub inspection: RuleSettings,
}

impl ContractSite {
    pub fn settings(&self, kind: InterventionKind) -> Option<&RuleSettings> {
        match kind {
            InterventionKind::Regular => Some(&self.regular),
            InterventionKind::Inspection => Some(&self.inspection),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Intervention
// ---------------------------------------------------------------------------

/// One scheduled or completed field visit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intervention {
    pub id: DbId,
    pub contract_id: Option<DbId>,
    pub client_id: DbId,
    pub site_id: Option<DbId>,
    pub kind: InterventionKind,
    pub status: InterventionStatus,
    pub planned_date: NaiveDate,
    pub planned_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub service_label: Option<String>,
    pub completed_on: Option<NaiveDate>,
    pub completed_by: Option<DbId>,
    pub notes: Option<String>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload for a new intervention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIntervention {
    pub contract_id: Option<DbId>,
    pub client_id: DbId,
    pub site_id: Option<DbId>,
    pub kind: InterventionKind,
    pub status: InterventionStatus,
    pub planned_date: NaiveDate,
    pub planned_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub service_label: Option<String>,
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterventionUpdate {
    pub status: Option<InterventionStatus>,
    pub planned_date: Option<NaiveDate>,
    pub planned_time: Option<NaiveTime>,
    pub completed_on: Option<NaiveDate>,
    pub completed_by: Option<DbId>,
    pub notes: Option<String>,
    pub updated_by: Option<DbId>,
}

impl InterventionUpdate {
    /// Move the planned date only.
    pub fn planned_on(date: NaiveDate) -> Self {
        Self {
            planned_date: Some(date),
            ..Self::default()
        }
    }
}

/// Append `line` to existing free-text notes, one entry per line.
pub fn append_note(existing: Option<&str>, line: &str) -> String {
    match existing.map(str::trim_end).filter(|s| !s.is_empty()) {
        Some(prev) => format!("{prev}\n{line}"),
        None => line.to_string(),
    }
}

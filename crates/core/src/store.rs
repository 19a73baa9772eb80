//! Persistence contract of the scheduling engine.
//!
//! The engine never talks to a database directly. Callers hand it a
//! [`SchedulingStore`] scoped to one unit of work (a Postgres transaction in
//! production), so every public operation either commits all its writes or
//! none of them.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::CoreError;
use crate::model::{Contract, Intervention, InterventionUpdate, NewIntervention};
use crate::status::{ContractKind, ContractStatus, InterventionKind, InterventionStatus};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Site restriction of an intervention query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SiteScope {
    /// Any site, including none.
    #[default]
    Any,
    /// Only visits without a site.
    SiteLess,
    /// Only visits of this site.
    Site(DbId),
}

impl SiteScope {
    /// The exact scope of a visit: its site, or explicitly none.
    pub fn of(site_id: Option<DbId>) -> Self {
        match site_id {
            Some(id) => Self::Site(id),
            None => Self::SiteLess,
        }
    }

    pub fn matches(self, site_id: Option<DbId>) -> bool {
        match self {
            Self::Any => true,
            Self::SiteLess => site_id.is_none(),
            Self::Site(id) => site_id == Some(id),
        }
    }
}

/// Intervention query. Every store implementation must return exactly the
/// records for which [`InterventionFilter::matches`] holds, ordered by
/// planned date then id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterventionFilter {
    pub contract_id: Option<DbId>,
    /// Only visits attached to some contract.
    pub has_contract: bool,
    pub site: SiteScope,
    pub kind: Option<InterventionKind>,
    /// Allowed statuses. Empty means any.
    pub statuses: Vec<InterventionStatus>,
    pub excluded_statuses: Vec<InterventionStatus>,
    /// Inclusive lower bound on the planned date.
    pub planned_from: Option<NaiveDate>,
    /// Inclusive upper bound on the planned date.
    pub planned_to: Option<NaiveDate>,
    /// Exclusive lower bound on the planned date.
    pub planned_after: Option<NaiveDate>,
    /// Exclusive upper bound on the planned date.
    pub planned_before: Option<NaiveDate>,
    pub excluded_id: Option<DbId>,
}

impl InterventionFilter {
    /// All visits of one contract/site/kind series.
    pub fn series(contract_id: DbId, site_id: Option<DbId>, kind: InterventionKind) -> Self {
        Self {
            contract_id: Some(contract_id),
            site: SiteScope::of(site_id),
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_statuses(mut self, statuses: &[InterventionStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    pub fn excluding_statuses(mut self, statuses: &[InterventionStatus]) -> Self {
        self.excluded_statuses = statuses.to_vec();
        self
    }

    pub fn planned_between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.planned_from = Some(from);
        self.planned_to = Some(to);
        self
    }

    pub fn planned_after(mut self, date: NaiveDate) -> Self {
        self.planned_after = Some(date);
        self
    }

    pub fn planned_before(mut self, date: NaiveDate) -> Self {
        self.planned_before = Some(date);
        self
    }

    pub fn excluding(mut self, id: DbId) -> Self {
        self.excluded_id = Some(id);
        self
    }

    pub fn matches(&self, i: &Intervention) -> bool {
        self.contract_id.map_or(true, |id| i.contract_id == Some(id))
            && (!self.has_contract || i.contract_id.is_some())
            && self.site.matches(i.site_id)
            && self.kind.map_or(true, |k| i.kind == k)
            && (self.statuses.is_empty() || self.statuses.contains(&i.status))
            && !self.excluded_statuses.contains(&i.status)
            && self.planned_from.map_or(true, |d| i.planned_date >= d)
            && self.planned_to.map_or(true, |d| i.planned_date <= d)
            && self.planned_after.map_or(true, |d| i.planned_date > d)
            && self.planned_before.map_or(true, |d| i.planned_date < d)
            && self.excluded_id.map_or(true, |id| i.id != id)
    }
}

/// Contract query. Listed contracts come without their site overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractFilter {
    pub status: Option<ContractStatus>,
    pub kind: Option<ContractKind>,
    /// Only contracts with an end date.
    pub has_end_date: bool,
}

impl ContractFilter {
    pub fn matches(&self, c: &Contract) -> bool {
        self.status.map_or(true, |s| c.status == s)
            && self.kind.map_or(true, |k| c.kind == k)
            && (!self.has_end_date || c.end_date.is_some())
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SchedulingStore: Send {
    /// Load a contract together with its site overrides.
    async fn find_contract(&mut self, id: DbId) -> Result<Option<Contract>, CoreError>;

    async fn list_contracts(&mut self, filter: &ContractFilter)
        -> Result<Vec<Contract>, CoreError>;

    /// Serialize scheduling work on a contract until the unit of work ends.
    async fn lock_contract(&mut self, id: DbId) -> Result<(), CoreError>;

    async fn find_intervention(&mut self, id: DbId) -> Result<Option<Intervention>, CoreError>;

    async fn list_interventions(
        &mut self,
        filter: &InterventionFilter,
    ) -> Result<Vec<Intervention>, CoreError>;

    async fn count_interventions(&mut self, filter: &InterventionFilter)
        -> Result<i64, CoreError>;

    async fn create_interventions(
        &mut self,
        items: &[NewIntervention],
    ) -> Result<Vec<Intervention>, CoreError>;

    async fn update_intervention(
        &mut self,
        id: DbId,
        update: &InterventionUpdate,
    ) -> Result<Intervention, CoreError>;
}

/// Load an intervention or fail with `NotFound`.
pub async fn require_intervention<S: SchedulingStore + ?Sized>(
    store: &mut S,
    id: DbId,
) -> Result<Intervention, CoreError> {
    store
        .find_intervention(id)
        .await?
        .ok_or(CoreError::not_found("Intervention", id))
}

/// Load a contract (with sites) or fail with `NotFound`.
pub async fn require_contract<S: SchedulingStore + ?Sized>(
    store: &mut S,
    id: DbId,
) -> Result<Contract, CoreError> {
    store
        .find_contract(id)
        .await?
        .ok_or(CoreError::not_found("Contract", id))
}

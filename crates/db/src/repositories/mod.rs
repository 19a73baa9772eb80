//! Repositories over a single `PgConnection`.
//!
//! Every function takes `&mut PgConnection` so callers can run it inside a
//! transaction (`&mut *tx`) or on a pooled connection alike.

pub mod contract_repo;
pub mod contract_site_repo;
pub mod intervention_repo;

pub use contract_repo::ContractRepo;
pub use contract_site_repo::ContractSiteRepo;
pub use intervention_repo::InterventionRepo;

//! Recurrence and anti-forgetting scheduling engine.
//!
//! Pure date arithmetic and decision functions live next to the async
//! operations that apply them through a [`store::SchedulingStore`]. The
//! crate has no database dependency; `sentinelle-db` provides the Postgres
//! store.

pub mod alert;
pub mod completion;
pub mod dashboard;
pub mod error;
pub mod frequency;
pub mod model;
pub mod planning;
pub mod recurrence;
pub mod reschedule;
pub mod status;
pub mod store;
pub mod types;
pub mod window;

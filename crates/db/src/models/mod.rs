//! Row structs and their conversion into engine types.
//!
//! Each submodule contains a `FromRow` struct matching the database row and
//! an `into_domain` conversion that decodes lookup ids and frequencies.

pub mod contract;
pub mod intervention;

use sentinelle_core::error::CoreError;
use sentinelle_core::recurrence::Frequency;
use sentinelle_core::status::StatusId;

/// Decode a lookup id, reporting unknown values as corrupt data.
pub(crate) fn decode_id<T>(
    from_id: fn(StatusId) -> Option<T>,
    column: &str,
    id: StatusId,
) -> Result<T, CoreError> {
    from_id(id).ok_or_else(|| CoreError::Internal(format!("Unknown {column} id {id}")))
}

pub(crate) fn decode_frequency(value: Option<&str>) -> Result<Option<Frequency>, CoreError> {
    value
        .map(|v| Frequency::parse(v).map_err(CoreError::Internal))
        .transpose()
}

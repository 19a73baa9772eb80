use chrono::{NaiveDate, NaiveTime};
use sentinelle_core::error::CoreError;
use sentinelle_core::model::Intervention;
use sentinelle_core::status::{InterventionKind, InterventionStatus, StatusId};
use sentinelle_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::decode_id;

/// A row from the `interventions` table.
#[derive(Debug, Clone, FromRow)]
pub struct InterventionRow {
    pub id: DbId,
    pub contract_id: Option<DbId>,
    pub client_id: DbId,
    pub site_id: Option<DbId>,
    pub kind_id: StatusId,
    pub status_id: StatusId,
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

impl InterventionRow {
    pub fn into_domain(self) -> Result<Intervention, CoreError> {
        Ok(Intervention {
            id: self.id,
            contract_id: self.contract_id,
            client_id: self.client_id,
            site_id: self.site_id,
            kind: decode_id(InterventionKind::from_id, "intervention kind", self.kind_id)?,
            status: decode_id(
                InterventionStatus::from_id,
                "intervention status",
                self.status_id,
            )?,
            planned_date: self.planned_date,
            planned_time: self.planned_time,
            duration_minutes: self.duration_minutes,
            service_label: self.service_label,
            completed_on: self.completed_on,
            completed_by: self.completed_by,
            notes: self.notes,
            updated_by: self.updated_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

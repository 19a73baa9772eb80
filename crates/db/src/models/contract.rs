//! Contract and contract site rows.
//!
//! Both tables carry the same eight recurrence columns, four per visit kind.

use chrono::{NaiveDate, NaiveTime};
use sentinelle_core::error::CoreError;
use sentinelle_core::model::{Contract, ContractSite, RuleSettings};
use sentinelle_core::status::{ContractKind, ContractStatus, StatusId};
use sentinelle_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::{decode_frequency, decode_id};

/// A row from the `contracts` table.
#[derive(Debug, Clone, FromRow)]
pub struct ContractRow {
    pub id: DbId,
    pub client_id: DbId,
    pub kind_id: StatusId,
    pub status_id: StatusId,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub services: Vec<String>,
    pub regular_frequency: Option<String>,
    pub regular_custom_days: Option<i32>,
    pub regular_count: Option<i32>,
    pub first_regular_date: Option<NaiveDate>,
    pub inspection_frequency: Option<String>,
    pub inspection_custom_days: Option<i32>,
    pub inspection_count: Option<i32>,
    pub first_inspection_date: Option<NaiveDate>,
    pub default_planned_time: Option<NaiveTime>,
    pub default_duration_minutes: Option<i32>,
    pub auto_create_next: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ContractRow {
    pub fn into_domain(self, sites: Vec<ContractSite>) -> Result<Contract, CoreError> {
        Ok(Contract {
            id: self.id,
            client_id: self.client_id,
            kind: decode_id(ContractKind::from_id, "contract kind", self.kind_id)?,
            status: decode_id(ContractStatus::from_id, "contract status", self.status_id)?,
            start_date: self.start_date,
            end_date: self.end_date,
            services: self.services,
            regular: RuleSettings {
                frequency: decode_frequency(self.regular_frequency.as_deref())?,
                custom_days: self.regular_custom_days,
                max_count: self.regular_count,
                first_date: self.first_regular_date,
            },
            inspection: RuleSettings {
                frequency: decode_frequency(self.inspection_frequency.as_deref())?,
                custom_days: self.inspection_custom_days,
                max_count: self.inspection_count,
                first_date: self.first_inspection_date,
            },
            default_planned_time: self.default_planned_time,
            default_duration_minutes: self.default_duration_minutes,
            auto_create_next: self.auto_create_next,
            sites,
        })
    }
}

/// A row from the `contract_sites` table.
#[derive(Debug, Clone, FromRow)]
pub struct ContractSiteRow {
    pub id: DbId,
    pub contract_id: DbId,
    pub site_id: DbId,
    pub services: Option<Vec<String>>,
    pub regular_frequency: Option<String>,
    pub regular_custom_days: Option<i32>,
    pub regular_count: Option<i32>,
    pub first_regular_date: Option<NaiveDate>,
    pub inspection_frequency: Option<String>,
    pub inspection_custom_days: Option<i32>,
    pub inspection_count: Option<i32>,
    pub first_inspection_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ContractSiteRow {
    pub fn into_domain(self) -> Result<ContractSite, CoreError> {
        Ok(ContractSite {
            id: self.id,
            contract_id: self.contract_id,
            site_id: self.site_id,
            services: self.services,
            regular: RuleSettings {
                frequency: decode_frequency(self.regular_frequency.as_deref())?,
                custom_days: self.regular_custom_days,
                max_count: self.regular_count,
                first_date: self.first_regular_date,
            },
            inspection: RuleSettings {
                frequency: decode_frequency(self.inspection_frequency.as_deref())?,
                custom_days: self.inspection_custom_days,
                max_count: self.inspection_count,
                first_date: self.first_inspection_date,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sentinelle_core::recurrence::Frequency;

    use super::*;

    fn row() -> ContractRow {
        ContractRow {
            id: 1,
            client_id: 2,
            kind_id: ContractKind::OneOff.id(),
            status_id: ContractStatus::Active.id(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            end_date: None,
            services: vec!["Rodents".into()],
            regular_frequency: Some("quarterly".into()),
            regular_custom_days: None,
            regular_count: Some(4),
            first_regular_date: None,
            inspection_frequency: None,
            inspection_custom_days: Some(45),
            inspection_count: None,
            first_inspection_date: None,
            default_planned_time: None,
            default_duration_minutes: Some(30),
            auto_create_next: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn decodes_lookup_ids_and_frequencies() {
        let contract = row().into_domain(Vec::new()).unwrap();
        assert_eq!(contract.kind, ContractKind::OneOff);
        assert_eq!(contract.status, ContractStatus::Active);
        assert_eq!(contract.regular.frequency, Some(Frequency::Quarterly));
        assert_eq!(contract.regular.max_count, Some(4));
        assert_eq!(contract.inspection.custom_days, Some(45));
    }

    #[test]
    fn unknown_status_id_is_internal_error() {
        let mut bad = row();
        bad.status_id = 99;
        assert!(matches!(
            bad.into_domain(Vec::new()),
            Err(CoreError::Internal(_))
        ));
    }

    #[test]
    fn unknown_frequency_is_internal_error() {
        let mut bad = row();
        bad.regular_frequency = Some("fortnightly".into());
        assert!(matches!(
            bad.into_domain(Vec::new()),
            Err(CoreError::Internal(_))
        ));
    }
}

//! Read access to the `contract_sites` overrides.

use sentinelle_core::types::DbId;
use sqlx::PgConnection;

use crate::models::contract::ContractSiteRow;

const COLUMNS: &str = "\
    id, contract_id, site_id, services, \
    regular_frequency, regular_custom_days, regular_count, first_regular_date, \
    inspection_frequency, inspection_custom_days, inspection_count, first_inspection_date, \
    created_at, updated_at";

pub struct ContractSiteRepo;

impl ContractSiteRepo {
    /// All site overrides of a contract, ordered by site.
    pub async fn list_by_contract(
        conn: &mut PgConnection,
        contract_id: DbId,
    ) -> Result<Vec<ContractSiteRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contract_sites WHERE contract_id = $1 ORDER BY site_id"
        );
        sqlx::query_as::<_, ContractSiteRow>(&query)
            .bind(contract_id)
            .fetch_all(conn)
            .await
    }
}

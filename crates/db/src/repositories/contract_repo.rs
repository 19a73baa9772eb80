//! Read access to the `contracts` table.

use sentinelle_core::store::ContractFilter;
use sentinelle_core::types::DbId;
use sqlx::PgConnection;

use crate::models::contract::ContractRow;

const COLUMNS: &str = "\
    id, client_id, kind_id, status_id, start_date, end_date, services, \
    regular_frequency, regular_custom_days, regular_count, first_regular_date, \
    inspection_frequency, inspection_custom_days, inspection_count, first_inspection_date, \
    default_planned_time, default_duration_minutes, auto_create_next, \
    created_at, updated_at";

pub struct ContractRepo;

impl ContractRepo {
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ContractRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contracts WHERE id = $1");
        sqlx::query_as::<_, ContractRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List contracts matching `filter`, ordered by id.
    pub async fn list(
        conn: &mut PgConnection,
        filter: &ContractFilter,
    ) -> Result<Vec<ContractRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contracts \
             WHERE ($1::SMALLINT IS NULL OR status_id = $1) \
               AND ($2::SMALLINT IS NULL OR kind_id = $2) \
               AND (NOT $3 OR end_date IS NOT NULL) \
             ORDER BY id"
        );
        sqlx::query_as::<_, ContractRow>(&query)
            .bind(filter.status.map(|s| s.id()))
            .bind(filter.kind.map(|k| k.id()))
            .bind(filter.has_end_date)
            .fetch_all(conn)
            .await
    }

    /// Take a row lock on the contract until the surrounding transaction
    /// ends. Returns `false` when the contract does not exist.
    pub async fn lock(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let locked = sqlx::query_scalar::<_, DbId>("SELECT id FROM contracts WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(locked.is_some())
    }
}

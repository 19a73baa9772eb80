//! Reads and writes on the `interventions` table.

use chrono::NaiveDate;
use sentinelle_core::model::{InterventionUpdate, NewIntervention};
use sentinelle_core::status::{InterventionStatus, StatusId};
use sentinelle_core::store::{InterventionFilter, SiteScope};
use sentinelle_core::types::DbId;
use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{PgConnection, Postgres};

use crate::models::intervention::InterventionRow;

const COLUMNS: &str = "\
    id, contract_id, client_id, site_id, kind_id, status_id, planned_date, \
    planned_time, duration_minutes, service_label, completed_on, completed_by, \
    notes, updated_by, created_at, updated_at";

const INSERT_COLUMNS: &str = "\
    contract_id, client_id, site_id, kind_id, status_id, planned_date, \
    planned_time, duration_minutes, service_label";

/// Parameters per inserted row; must match `INSERT_COLUMNS`.
const INSERT_PARAMS: usize = 9;

/// Rows per multi-row INSERT, keeping well under the Postgres bind limit.
const INSERT_CHUNK: usize = 1000;

pub struct InterventionRepo;

impl InterventionRepo {
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<InterventionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM interventions WHERE id = $1");
        sqlx::query_as::<_, InterventionRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Visits matching `filter`, ordered by planned date then id.
    pub async fn list(
        conn: &mut PgConnection,
        filter: &InterventionFilter,
    ) -> Result<Vec<InterventionRow>, sqlx::Error> {
        let (where_clause, bind_values) = build_filter(filter);
        let query = format!(
            "SELECT {COLUMNS} FROM interventions {where_clause} ORDER BY planned_date, id"
        );
        bind_values_as(sqlx::query_as::<_, InterventionRow>(&query), &bind_values)
            .fetch_all(conn)
            .await
    }

    pub async fn count(
        conn: &mut PgConnection,
        filter: &InterventionFilter,
    ) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values) = build_filter(filter);
        let query = format!("SELECT COUNT(*)::BIGINT FROM interventions {where_clause}");
        bind_values_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values)
            .fetch_one(conn)
            .await
    }

    /// Insert visits with multi-row INSERTs, returning them in input order.
    pub async fn create_many(
        conn: &mut PgConnection,
        items: &[NewIntervention],
    ) -> Result<Vec<InterventionRow>, sqlx::Error> {
        let mut created = Vec::with_capacity(items.len());

        for chunk in items.chunks(INSERT_CHUNK) {
            let rows: Vec<String> = (0..chunk.len())
                .map(|row| {
                    let params: Vec<String> = (1..=INSERT_PARAMS)
                        .map(|col| format!("${}", row * INSERT_PARAMS + col))
                        .collect();
                    format!("({})", params.join(", "))
                })
                .collect();
            let query = format!(
                "INSERT INTO interventions ({INSERT_COLUMNS}) VALUES {} RETURNING {COLUMNS}",
                rows.join(", ")
            );

            let mut q = sqlx::query_as::<_, InterventionRow>(&query);
            for item in chunk {
                q = q
                    .bind(item.contract_id)
                    .bind(item.client_id)
                    .bind(item.site_id)
                    .bind(item.kind.id())
                    .bind(item.status.id())
                    .bind(item.planned_date)
                    .bind(item.planned_time)
                    .bind(item.duration_minutes)
                    .bind(&item.service_label);
            }
            let mut inserted = q.fetch_all(&mut *conn).await?;
            // RETURNING order is not guaranteed; ids follow insertion order.
            inserted.sort_by_key(|r| r.id);
            created.extend(inserted);
        }

        Ok(created)
    }

    /// Apply a partial update. `None` fields keep their current value.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &InterventionUpdate,
    ) -> Result<Option<InterventionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE interventions SET \
                status_id = COALESCE($2, status_id), \
                planned_date = COALESCE($3, planned_date), \
                planned_time = COALESCE($4, planned_time), \
                completed_on = COALESCE($5, completed_on), \
                completed_by = COALESCE($6, completed_by), \
                notes = COALESCE($7, notes), \
                updated_by = COALESCE($8, updated_by), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InterventionRow>(&query)
            .bind(id)
            .bind(input.status.map(InterventionStatus::id))
            .bind(input.planned_date)
            .bind(input.planned_time)
            .bind(input.completed_on)
            .bind(input.completed_by)
            .bind(&input.notes)
            .bind(input.updated_by)
            .fetch_optional(conn)
            .await
    }
}

// ---------------------------------------------------------------------------
// Dynamic filter
// ---------------------------------------------------------------------------

/// Typed bind value for the dynamically-built filter.
#[derive(Debug, Clone, PartialEq)]
enum BindValue {
    BigInt(i64),
    SmallInt(StatusId),
    SmallInts(Vec<StatusId>),
    Date(NaiveDate),
}

fn status_ids(statuses: &[InterventionStatus]) -> Vec<StatusId> {
    statuses.iter().map(|s| s.id()).collect()
}

/// Build a WHERE clause mirroring [`InterventionFilter::matches`].
///
/// The clause is empty when no condition is active, or starts with `WHERE `.
fn build_filter(filter: &InterventionFilter) -> (String, Vec<BindValue>) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_values: Vec<BindValue> = Vec::new();

    let mut push = |template: &str, value: BindValue| {
        bind_values.push(value);
        conditions.push(template.replace('?', &format!("${}", bind_values.len())));
    };

    if let Some(contract_id) = filter.contract_id {
        push("contract_id = ?", BindValue::BigInt(contract_id));
    }
    if let SiteScope::Site(site_id) = filter.site {
        push("site_id = ?", BindValue::BigInt(site_id));
    }
    if let Some(kind) = filter.kind {
        push("kind_id = ?", BindValue::SmallInt(kind.id()));
    }
    if !filter.statuses.is_empty() {
        push(
            "status_id = ANY(?)",
            BindValue::SmallInts(status_ids(&filter.statuses)),
        );
    }
    if !filter.excluded_statuses.is_empty() {
        push(
            "status_id <> ALL(?)",
            BindValue::SmallInts(status_ids(&filter.excluded_statuses)),
        );
    }
    if let Some(date) = filter.planned_from {
        push("planned_date >= ?", BindValue::Date(date));
    }
    if let Some(date) = filter.planned_to {
        push("planned_date <= ?", BindValue::Date(date));
    }
    if let Some(date) = filter.planned_after {
        push("planned_date > ?", BindValue::Date(date));
    }
    if let Some(date) = filter.planned_before {
        push("planned_date < ?", BindValue::Date(date));
    }
    if let Some(id) = filter.excluded_id {
        push("id <> ?", BindValue::BigInt(id));
    }

    if filter.has_contract {
        conditions.push("contract_id IS NOT NULL".to_string());
    }
    if filter.site == SiteScope::SiteLess {
        conditions.push("site_id IS NULL".to_string());
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values)
}

fn bind_values_as<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    bind_values: &'q [BindValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::SmallInt(v) => q = q.bind(*v),
            BindValue::SmallInts(v) => q = q.bind(v.as_slice()),
            BindValue::Date(v) => q = q.bind(*v),
        }
    }
    q
}

fn bind_values_scalar<'q>(
    mut q: QueryScalar<'q, Postgres, i64, PgArguments>,
    bind_values: &'q [BindValue],
) -> QueryScalar<'q, Postgres, i64, PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::SmallInt(v) => q = q.bind(*v),
            BindValue::SmallInts(v) => q = q.bind(v.as_slice()),
            BindValue::Date(v) => q = q.bind(*v),
        }
    }
    q
}

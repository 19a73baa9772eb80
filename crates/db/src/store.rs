//! [`SchedulingStore`] backed by one Postgres transaction.

use async_trait::async_trait;
use sentinelle_core::error::CoreError;
use sentinelle_core::model::{Contract, Intervention, InterventionUpdate, NewIntervention};
use sentinelle_core::store::{ContractFilter, InterventionFilter, SchedulingStore};
use sentinelle_core::types::DbId;
use sqlx::{Postgres, Transaction};

use crate::repositories::{ContractRepo, ContractSiteRepo, InterventionRepo};
use crate::DbPool;

/// A unit of scheduling work. Nothing is visible to other connections until
/// [`PgSchedulingStore::commit`]; dropping the store rolls back.
pub struct PgSchedulingStore {
    tx: Transaction<'static, Postgres>,
}

impl PgSchedulingStore {
    pub async fn begin(pool: &DbPool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}

fn store_error(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Scheduling store query failed");
    CoreError::Internal(format!("Database error: {err}"))
}

#[async_trait]
impl SchedulingStore for PgSchedulingStore {
    async fn find_contract(&mut self, id: DbId) -> Result<Option<Contract>, CoreError> {
        let Some(row) = ContractRepo::find_by_id(&mut *self.tx, id)
            .await
            .map_err(store_error)?
        else {
            return Ok(None);
        };
        let sites = ContractSiteRepo::list_by_contract(&mut *self.tx, id)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(|s| s.into_domain())
            .collect::<Result<Vec<_>, _>>()?;
        row.into_domain(sites).map(Some)
    }

    async fn list_contracts(&mut self, filter: &ContractFilter) -> Result<Vec<Contract>, CoreError> {
        ContractRepo::list(&mut *self.tx, filter)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(|row| row.into_domain(Vec::new()))
            .collect()
    }

    async fn lock_contract(&mut self, id: DbId) -> Result<(), CoreError> {
        if ContractRepo::lock(&mut *self.tx, id).await.map_err(store_error)? {
            Ok(())
        } else {
            Err(CoreError::not_found("Contract", id))
        }
    }

    async fn find_intervention(&mut self, id: DbId) -> Result<Option<Intervention>, CoreError> {
        InterventionRepo::find_by_id(&mut *self.tx, id)
            .await
            .map_err(store_error)?
            .map(|row| row.into_domain())
            .transpose()
    }

    async fn list_interventions(
        &mut self,
        filter: &InterventionFilter,
    ) -> Result<Vec<Intervention>, CoreError> {
        InterventionRepo::list(&mut *self.tx, filter)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(|row| row.into_domain())
            .collect()
    }

    async fn count_interventions(&mut self, filter: &InterventionFilter) -> Result<i64, CoreError> {
        InterventionRepo::count(&mut *self.tx, filter)
            .await
            .map_err(store_error)
    }

    async fn create_interventions(
        &mut self,
        items: &[NewIntervention],
    ) -> Result<Vec<Intervention>, CoreError> {
        InterventionRepo::create_many(&mut *self.tx, items)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(|row| row.into_domain())
            .collect()
    }

    async fn update_intervention(
        &mut self,
        id: DbId,
        update: &InterventionUpdate,
    ) -> Result<Intervention, CoreError> {
        InterventionRepo::update(&mut *self.tx, id, update)
            .await
            .map_err(store_error)?
            .ok_or(CoreError::not_found("Intervention", id))?
            .into_domain()
    }
}

//! Farm plan record store.
//!
//! Records are created once and never updated. Two backends share one
//! interface: PostgreSQL for deployments and an in-memory list used when no
//! database is configured (and by tests).

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PostgresStore, SCHEMA};

use thiserror::Error;
use uuid::Uuid;

use crate::model::{FarmPlanRecord, NewFarmPlan};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("plan {0} not found")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Record store handle. Cheap to clone.
#[derive(Clone)]
pub enum PlanStore {
    Memory(MemoryStore),
    Postgres(PostgresStore),
}

impl PlanStore {
    pub fn in_memory() -> Self {
        PlanStore::Memory(MemoryStore::new())
    }

    /// Connect to PostgreSQL and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        Ok(PlanStore::Postgres(PostgresStore::connect(database_url).await?))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            PlanStore::Memory(_) => "memory",
            PlanStore::Postgres(_) => "postgres",
        }
    }

    /// Insert a new record with a fresh id and creation time.
    pub async fn create(&self, plan: NewFarmPlan) -> Result<FarmPlanRecord, StoreError> {
        let record = plan.into_record();
        match self {
            PlanStore::Memory(store) => store.insert(record).await,
            PlanStore::Postgres(store) => store.insert(record).await,
        }
    }

    /// All records, newest first.
    pub async fn list(&self) -> Result<Vec<FarmPlanRecord>, StoreError> {
        match self {
            PlanStore::Memory(store) => store.list().await,
            PlanStore::Postgres(store) => store.list().await,
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<FarmPlanRecord, StoreError> {
        let found = match self {
            PlanStore::Memory(store) => store.get(id).await?,
            PlanStore::Postgres(store) => store.get(id).await?,
        };
        found.ok_or(StoreError::NotFound(id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let deleted = match self {
            PlanStore::Memory(store) => store.delete(id).await?,
            PlanStore::Postgres(store) => store.delete(id).await?,
        };
        if deleted {
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }

    pub async fn find_by_request_id(&self, request_id: &str) -> Result<Option<FarmPlanRecord>, StoreError> {
        match self {
            PlanStore::Memory(store) => store.find_by_request_id(request_id).await,
            PlanStore::Postgres(store) => store.find_by_request_id(request_id).await,
        }
    }
}

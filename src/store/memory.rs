use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::StoreError;
use crate::model::FarmPlanRecord;

/// Records kept in insertion order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<FarmPlanRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) async fn insert(&self, record: FarmPlanRecord) -> Result<FarmPlanRecord, StoreError> {
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    pub(super) async fn list(&self) -> Result<Vec<FarmPlanRecord>, StoreError> {
        Ok(self.records.read().await.iter().rev().cloned().collect())
    }

    pub(super) async fn get(&self, id: Uuid) -> Result<Option<FarmPlanRecord>, StoreError> {
        Ok(self.records.read().await.iter().find(|r| r.id == id).cloned())
    }

    pub(super) async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }

    pub(super) async fn find_by_request_id(&self, request_id: &str) -> Result<Option<FarmPlanRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.request_id.as_deref() == Some(request_id))
            .cloned())
    }
}

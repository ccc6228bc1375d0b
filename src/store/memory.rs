use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{validate_id, ContentStore, StoreError, StoreResult, TriviaRecord};
use crate::types::TriviaId;

/// Records kept in process memory. Used by tests and for throwaway servers.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<TriviaId, TriviaRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = TriviaRecord>) -> Self {
        let records = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch(&self, id: &str) -> StoreResult<TriviaRecord> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list(&self) -> StoreResult<Vec<TriviaRecord>> {
        let mut records: Vec<_> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    async fn save(&self, record: &TriviaRecord) -> StoreResult<()> {
        validate_id(&record.id)?;
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.records
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

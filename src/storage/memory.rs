use std::sync::Arc;

use dashmap::DashMap;

use super::{Store, StoreResult};
use crate::models::PasteRecord;

/// Process-lifetime store backed by a [`DashMap`].
///
/// Clones share the same map. Nothing is ever evicted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<DashMap<String, PasteRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    async fn get(&self, id: &str) -> StoreResult<Option<PasteRecord>> {
        Ok(self.records.get(id).map(|record| record.value().clone()))
    }

    async fn set(&self, id: &str, record: PasteRecord) -> StoreResult<()> {
        self.records.insert(id.to_owned(), record);
        Ok(())
    }

    async fn has(&self, id: &str) -> StoreResult<bool> {
        Ok(self.records.contains_key(id))
    }

    async fn record_view(&self, id: &str, now: i64) -> StoreResult<Option<PasteRecord>> {
        // the shard write lock is held until `record` drops
        let Some(mut record) = self.records.get_mut(id) else {
            return Ok(None);
        };
        if !record.is_visible(now) {
            return Ok(None);
        }
        record.views = record.views.saturating_add(1);
        Ok(Some(record.value().clone()))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};

use super::{Insertion, Result, UrlStore};
use crate::model::UrlRecord;

/// Thread-safe in-memory store mapping short ID -> record.
///
/// Backed by a DashMap; the entry API holds the shard lock between the
/// existence check and the write, so insert-if-absent is atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: DashMap<String, UrlRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UrlStore for MemoryStore {
    async fn insert(&self, record: UrlRecord) -> Result<Insertion> {
        match self.inner.entry(record.id.clone()) {
            Entry::Occupied(existing) => Ok(Insertion::AlreadyExists(existing.get().clone())),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(Insertion::Created)
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Option<UrlRecord>> {
        Ok(self.inner.get(id).map(|r| r.value().clone()))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.inner.len() as u64)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

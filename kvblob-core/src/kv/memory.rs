use crate::error::Result;
use crate::kv::{KvPair, RawKvClient};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, RwLock};

/// In-process ordered store shared by every client built from it
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: Arc<RwLock<BTreeMap<Bytes, Bytes>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a new client handle over this store
    pub fn client(&self) -> MemoryKvClient {
        MemoryKvClient {
            entries: self.entries.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<Bytes, Bytes>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Client handle over a [`MemoryKv`] store
#[derive(Debug, Clone)]
pub struct MemoryKvClient {
    entries: Arc<RwLock<BTreeMap<Bytes, Bytes>>>,
}

#[async_trait]
impl RawKvClient for MemoryKvClient {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: Bytes, value: Bytes) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key, value);
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.remove(key);
        Ok(())
    }

    async fn scan(&self, start: &[u8], end: &[u8], limit: usize) -> Result<Vec<KvPair>> {
        if limit == 0 || start >= end {
            return Ok(Vec::new());
        }

        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let range = (
            Bound::Included(Bytes::copy_from_slice(start)),
            Bound::Excluded(Bytes::copy_from_slice(end)),
        );

        Ok(entries
            .range(range)
            .take(limit)
            .map(|(key, value)| KvPair::new(key.clone(), value.clone()))
            .collect())
    }
}

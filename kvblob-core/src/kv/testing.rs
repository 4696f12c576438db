use crate::error::{KvBlobError, Result};
use crate::kv::memory::{MemoryKv, MemoryKvClient};
use crate::kv::{KvPair, RawKvClient};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Which storage calls should fail
#[derive(Debug, Default)]
pub(crate) struct Faults {
    pub(crate) scan: AtomicBool,
    pub(crate) get: AtomicBool,
    /// `get` reports every key as absent, as if deleted after the scan
    pub(crate) vanish: AtomicBool,
    pub(crate) put: AtomicBool,
    pub(crate) delete: AtomicBool,
    pub(crate) puts: AtomicUsize,
    pub(crate) deletes: AtomicUsize,
}

impl Faults {
    pub(crate) fn fail(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    pub(crate) fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub(crate) fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

/// Memory-backed client that can be told to fail individual calls
pub(crate) struct FaultyKvClient {
    inner: MemoryKvClient,
    faults: Arc<Faults>,
}

impl FaultyKvClient {
    pub(crate) fn new(store: &MemoryKv) -> (Self, Arc<Faults>) {
        let faults = Arc::new(Faults::default());
        (
            Self {
                inner: store.client(),
                faults: faults.clone(),
            },
            faults,
        )
    }

    fn check(flag: &AtomicBool, call: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(KvBlobError::Upstream(format!("injected {} failure", call)));
        }
        Ok(())
    }
}

#[async_trait]
impl RawKvClient for FaultyKvClient {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        Self::check(&self.faults.get, "get")?;
        if self.faults.vanish.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: Bytes, value: Bytes) -> Result<()> {
        self.faults.puts.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.faults.put, "put")?;
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        self.faults.deletes.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.faults.delete, "delete")?;
        self.inner.delete(key).await
    }

    async fn scan(&self, start: &[u8], end: &[u8], limit: usize) -> Result<Vec<KvPair>> {
        Self::check(&self.faults.scan, "scan")?;
        self.inner.scan(start, end, limit).await
    }
}

//! Bounded pool of storage client handles
//!
//! A handle is owned by at most one caller at a time. Checking one out
//! yields a [`PooledClient`] guard; dropping the guard puts the handle back,
//! which covers early returns, errors and cancelled futures alike.

use crate::error::{KvBlobError, Result};
use crate::kv::{DynKvClient, RawKvClient};
use std::ops::Deref;
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

pub const DEFAULT_POOL_SIZE: usize = 10;

struct PoolInner {
    idle: Mutex<Vec<Arc<dyn RawKvClient>>>,
    // One permit per idle handle; a permit is only returned after its handle is
    permits: Arc<Semaphore>,
    size: usize,
}

impl PoolInner {
    fn checkout(self: &Arc<Self>, permit: OwnedSemaphorePermit) -> Result<PooledClient> {
        let client = self
            .idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop()
            .ok_or(KvBlobError::PoolExhausted { size: self.size })?;

        Ok(PooledClient {
            client,
            pool: self.clone(),
            _permit: permit,
        })
    }

    fn checkin(&self, client: Arc<dyn RawKvClient>) {
        self.idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(client);
    }
}

/// Fixed-size pool of client handles, cheap to clone and share
#[derive(Clone)]
pub struct ClientPool {
    inner: Arc<PoolInner>,
}

impl ClientPool {
    pub fn new(clients: Vec<DynKvClient>) -> Self {
        let size = clients.len();
        let idle: Vec<Arc<dyn RawKvClient>> = clients.into_iter().map(Arc::from).collect();

        Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(idle),
                permits: Arc::new(Semaphore::new(size)),
                size,
            }),
        }
    }

    /// Total number of handles, checked out or not
    pub fn size(&self) -> usize {
        self.inner.size
    }

    /// Number of handles currently sitting in the pool
    pub fn available(&self) -> usize {
        self.inner.permits.available_permits()
    }

    /// Check out a handle without waiting.
    ///
    /// Fails with [`KvBlobError::PoolExhausted`] when every handle is in use
    /// or the pool was built empty.
    pub fn try_acquire(&self) -> Result<PooledClient> {
        let permit = self
            .inner
            .permits
            .clone()
            .try_acquire_owned()
            .map_err(|_| KvBlobError::PoolExhausted {
                size: self.inner.size,
            })?;

        self.inner.checkout(permit)
    }

    /// Check out a handle, waiting for one to be released if necessary.
    ///
    /// An empty pool can never satisfy the wait, so it fails immediately.
    pub async fn acquire(&self) -> Result<PooledClient> {
        if self.inner.size == 0 {
            return Err(KvBlobError::PoolExhausted { size: 0 });
        }

        let permit = self
            .inner
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| KvBlobError::PoolExhausted {
                size: self.inner.size,
            })?;

        self.inner.checkout(permit)
    }
}

impl std::fmt::Debug for ClientPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientPool")
            .field("size", &self.size())
            .field("available", &self.available())
            .finish()
    }
}

/// A checked-out handle; returns itself to the pool on drop
pub struct PooledClient {
    client: Arc<dyn RawKvClient>,
    pool: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledClient {
    type Target = dyn RawKvClient;

    fn deref(&self) -> &Self::Target {
        self.client.as_ref()
    }
}

impl Drop for PooledClient {
    fn drop(&mut self) {
        // The handle goes back before the permit field is dropped
        self.pool.checkin(self.client.clone());
    }
}

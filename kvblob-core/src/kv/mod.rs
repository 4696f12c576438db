//! Storage capability consumed by the blob operations
//!
//! Provides a trait-based abstraction over the raw key-value store
//! (etcd, in-memory, etc.)

pub mod etcd;
pub mod factory;
pub mod memory;
#[cfg(test)]
pub(crate) mod testing;

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

pub use factory::KvClientBuilder;

/// A key/value pair returned by a range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvPair {
    pub key: Bytes,
    pub value: Bytes,
}

impl KvPair {
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Trait for raw key-value client handles
#[async_trait]
pub trait RawKvClient: Send + Sync {
    /// Fetch the value stored under `key`, `None` if absent
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>>;

    /// Store `value` under `key`, replacing any previous value
    async fn put(&self, key: Bytes, value: Bytes) -> Result<()>;

    /// Remove `key`; removing an absent key is not an error
    async fn delete(&self, key: &[u8]) -> Result<()>;

    /// Scan `[start, end)` in ascending key order, returning at most `limit` pairs
    async fn scan(&self, start: &[u8], end: &[u8], limit: usize) -> Result<Vec<KvPair>>;
}

/// Type alias for a boxed client handle
pub type DynKvClient = Box<dyn RawKvClient>;

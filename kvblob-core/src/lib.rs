//! kvblob core - blob operations over a pooled raw key-value store
//!
//! Blobs are stored by content under a single flat key prefix:
//! - a bounded pool of storage client handles shared by all requests
//! - value lookups by linear scan over one window of keys
//! - create / read / update / delete operations on top of both

pub mod error;
pub mod keyspace;
pub mod kv;
pub mod locator;
pub mod monitor;
pub mod operations;
pub mod pool;

pub use error::{KvBlobError, Result};
pub use keyspace::{BlobKeyspace, DEFAULT_KEY_PREFIX, SCAN_LIMIT};
pub use kv::etcd::EtcdKvClient;
pub use kv::memory::{MemoryKv, MemoryKvClient};
pub use kv::{DynKvClient, KvClientBuilder, KvPair, RawKvClient};
pub use locator::find_key_by_value;
pub use monitor::{BlobMonitor, DEFAULT_MONITOR_INTERVAL};
pub use operations::*;
pub use pool::{ClientPool, DEFAULT_POOL_SIZE, PooledClient};

use bytes::Bytes;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

pub const DEFAULT_KEY_PREFIX: &str = "blob";

/// Maximum number of keys a single scan returns. Blobs beyond this window are
/// invisible to listing, counting and value lookups.
pub const SCAN_LIMIT: usize = 100;

/// Flat keyspace holding every blob: `<prefix>:<unix-nanos>`
#[derive(Debug)]
pub struct BlobKeyspace {
    prefix: String,
    start: Bytes,
    end: Bytes,
    last_issued: AtomicI64,
}

impl BlobKeyspace {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let start = Bytes::from(format!("{}:", prefix));
        // '~' sorts after every digit, so `<prefix>:~` closes the key range
        let end = Bytes::from(format!("{}:~", prefix));

        Self {
            prefix,
            start,
            end,
            last_issued: AtomicI64::new(0),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Inclusive scan start
    pub fn start_key(&self) -> &[u8] {
        &self.start
    }

    /// Exclusive scan end
    pub fn end_key(&self) -> &[u8] {
        &self.end
    }

    pub fn scan_limit(&self) -> usize {
        SCAN_LIMIT
    }

    /// Issue a fresh key from the wall clock, strictly greater than any key
    /// this keyspace issued before.
    pub fn next_key(&self) -> Bytes {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);

        let mut previous = self.last_issued.load(Ordering::Relaxed);
        let issued = loop {
            let candidate = now.max(previous.saturating_add(1));
            match self.last_issued.compare_exchange_weak(
                previous,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break candidate,
                Err(actual) => previous = actual,
            }
        };

        let key = self.key_for(issued);
        debug_assert!(self.contains(&key));
        key
    }

    pub fn key_for(&self, timestamp_nanos: i64) -> Bytes {
        Bytes::from(format!("{}:{}", self.prefix, timestamp_nanos))
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        key >= self.start_key() && key < self.end_key()
    }
}

impl Default for BlobKeyspace {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

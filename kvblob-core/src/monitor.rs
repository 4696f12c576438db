//! Periodic blob count reporting
//!
//! The monitor competes with request handlers for pooled clients: it waits
//! for a free handle on every tick instead of holding one of its own.

use crate::Result;
use crate::operations::ReadBlobsOperation;
use crate::pool::ClientPool;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(30);

pub struct BlobMonitor {
    pool: ClientPool,
    reader: ReadBlobsOperation,
    interval: Duration,
    sink: watch::Sender<Option<usize>>,
}

impl BlobMonitor {
    /// Returns the monitor and a receiver that observes every published count
    pub fn new(
        pool: ClientPool,
        reader: ReadBlobsOperation,
        interval: Duration,
    ) -> (Self, watch::Receiver<Option<usize>>) {
        let (sink, receiver) = watch::channel(None);
        let monitor = Self {
            pool,
            reader,
            interval: interval.max(Duration::from_millis(1)),
            sink,
        };

        (monitor, receiver)
    }

    /// Count blobs once through a pooled client
    pub async fn tick(&self) -> Result<usize> {
        let client = self.pool.acquire().await?;
        self.reader.count(&*client).await
    }

    /// Run forever on a background task; the first count happens one interval from now
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Blob monitor started, interval={:?}", self.interval);

        loop {
            ticker.tick().await;
            match self.tick().await {
                Ok(count) => {
                    tracing::info!("Number of blobs: {}", count);
                    self.sink.send_replace(Some(count));
                }
                Err(error) => {
                    tracing::warn!("Failed to count blobs: {}", error);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyspace::BlobKeyspace;
    use crate::kv::memory::MemoryKv;
    use crate::kv::testing::{FaultyKvClient, Faults};
    use crate::kv::{DynKvClient, RawKvClient};
    use bytes::Bytes;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    async fn store_with(count: usize) -> MemoryKv {
        let store = MemoryKv::new();
        let keyspace = BlobKeyspace::default();
        let client = store.client();
        for index in 0..count {
            client
                .put(keyspace.next_key(), Bytes::from(format!("blob-{}", index)))
                .await
                .unwrap();
        }
        store
    }

    fn reader() -> ReadBlobsOperation {
        ReadBlobsOperation::new(Arc::new(BlobKeyspace::default()))
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_count_every_interval() {
        let store = store_with(2).await;
        let pool = ClientPool::new(vec![Box::new(store.client()) as DynKvClient]);

        let (monitor, mut counts) =
            BlobMonitor::new(pool.clone(), reader(), DEFAULT_MONITOR_INTERVAL);
        let started = Instant::now();
        let handle = monitor.spawn();

        counts.changed().await.unwrap();
        assert_eq!(*counts.borrow(), Some(2));
        assert!(started.elapsed() >= DEFAULT_MONITOR_INTERVAL);

        store
            .client()
            .put(Bytes::from_static(b"blob:9"), Bytes::from_static(b"late"))
            .await
            .unwrap();
        counts.changed().await.unwrap();
        assert_eq!(*counts.borrow(), Some(3));

        assert_eq!(pool.available(), 1);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_swallowed_and_the_loop_continues() {
        let store = store_with(1).await;
        let (client, faults) = FaultyKvClient::new(&store);
        Faults::fail(&faults.scan);
        let pool = ClientPool::new(vec![Box::new(client) as DynKvClient]);

        let (monitor, mut counts) =
            BlobMonitor::new(pool.clone(), reader(), Duration::from_secs(5));
        let handle = monitor.spawn();

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert_eq!(*counts.borrow(), None);
        assert!(!handle.is_finished());
        assert_eq!(pool.available(), 1);

        faults.scan.store(false, Ordering::SeqCst);
        counts.changed().await.unwrap();
        assert_eq!(*counts.borrow(), Some(1));

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_a_free_client() {
        let store = store_with(4).await;
        let pool = ClientPool::new(vec![Box::new(store.client()) as DynKvClient]);
        let held = pool.try_acquire().unwrap();

        let (monitor, mut counts) =
            BlobMonitor::new(pool.clone(), reader(), Duration::from_secs(1));
        let handle = monitor.spawn();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(*counts.borrow(), None);

        drop(held);
        counts.changed().await.unwrap();
        assert_eq!(*counts.borrow(), Some(4));

        handle.abort();
    }

    #[tokio::test]
    async fn tick_on_an_empty_pool_fails() {
        let pool = ClientPool::new(Vec::new());
        let (monitor, _counts) = BlobMonitor::new(pool, reader(), Duration::from_secs(1));

        assert!(monitor.tick().await.is_err());
    }
}

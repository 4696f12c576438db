use crate::keyspace::BlobKeyspace;
use crate::kv::RawKvClient;
use crate::locator::find_key_by_value;
use crate::{KvBlobError, Result};
use bytes::Bytes;
use std::sync::Arc;

#[derive(Clone)]
pub struct CreateBlobOperation {
    keyspace: Arc<BlobKeyspace>,
}

#[derive(Debug, Clone)]
pub struct CreateBlobOperationRequest {
    pub blob: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBlobOperationResult {
    pub key: Bytes,
    pub blob: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateBlobOperationOutcome {
    Created(CreateBlobOperationResult),
    /// A blob with the same value is already stored in the scan window
    Duplicate,
}

impl CreateBlobOperation {
    pub fn new(keyspace: Arc<BlobKeyspace>) -> Self {
        Self { keyspace }
    }

    /// Store a new blob unless an equal one is already visible.
    ///
    /// The duplicate check and the write are separate storage calls, so two
    /// concurrent creates of the same value may both succeed.
    pub async fn run(
        &self,
        client: &dyn RawKvClient,
        request: CreateBlobOperationRequest,
    ) -> Result<CreateBlobOperationOutcome> {
        let CreateBlobOperationRequest { blob } = request;

        if blob.is_empty() {
            return Err(KvBlobError::InvalidRequest("No blob provided".to_string()));
        }

        if find_key_by_value(client, &self.keyspace, &blob)
            .await?
            .is_some()
        {
            return Ok(CreateBlobOperationOutcome::Duplicate);
        }

        let key = self.keyspace.next_key();
        client
            .put(key.clone(), blob.clone())
            .await
            .map_err(|error| KvBlobError::upstream("Failed to save blob", error))?;

        tracing::debug!("Created blob under key {}", String::from_utf8_lossy(&key));

        Ok(CreateBlobOperationOutcome::Created(
            CreateBlobOperationResult { key, blob },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::memory::MemoryKv;
    use crate::kv::memory::MemoryKvClient;
    use crate::kv::testing::{FaultyKvClient, Faults};
    use crate::kv::KvPair;
    use async_trait::async_trait;
    use tokio::sync::Barrier;

    /// Releases a scan only once every party has read the store
    struct LockstepKvClient {
        inner: MemoryKvClient,
        barrier: Arc<Barrier>,
    }

    #[async_trait]
    impl RawKvClient for LockstepKvClient {
        async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
            self.inner.get(key).await
        }

        async fn put(&self, key: Bytes, value: Bytes) -> Result<()> {
            self.inner.put(key, value).await
        }

        async fn delete(&self, key: &[u8]) -> Result<()> {
            self.inner.delete(key).await
        }

        async fn scan(&self, start: &[u8], end: &[u8], limit: usize) -> Result<Vec<KvPair>> {
            let pairs = self.inner.scan(start, end, limit).await?;
            self.barrier.wait().await;
            Ok(pairs)
        }
    }

    fn create(blob: &'static str) -> CreateBlobOperationRequest {
        CreateBlobOperationRequest {
            blob: Bytes::from_static(blob.as_bytes()),
        }
    }

    #[tokio::test]
    async fn stores_new_blob_under_prefixed_key() {
        let store = MemoryKv::new();
        let client = store.client();
        let operation = CreateBlobOperation::new(Arc::new(BlobKeyspace::default()));

        let outcome = operation
            .run(&client, create("To be or not to be"))
            .await
            .unwrap();

        let CreateBlobOperationOutcome::Created(result) = outcome else {
            panic!("expected a created blob");
        };
        assert!(result.key.starts_with(b"blob:"));
        assert_eq!(result.blob, Bytes::from_static(b"To be or not to be"));
        assert_eq!(
            client.get(&result.key).await.unwrap(),
            Some(result.blob.clone())
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn rejects_duplicates_without_writing() {
        let store = MemoryKv::new();
        let (client, faults) = FaultyKvClient::new(&store);
        let operation = CreateBlobOperation::new(Arc::new(BlobKeyspace::default()));

        operation.run(&client, create("same")).await.unwrap();
        assert_eq!(faults.put_calls(), 1);

        let outcome = operation.run(&client, create("same")).await.unwrap();
        assert_eq!(outcome, CreateBlobOperationOutcome::Duplicate);
        assert_eq!(faults.put_calls(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn empty_blob_never_reaches_storage() {
        let store = MemoryKv::new();
        let (client, faults) = FaultyKvClient::new(&store);
        let operation = CreateBlobOperation::new(Arc::new(BlobKeyspace::default()));

        let result = operation.run(&client, create("")).await;
        assert!(matches!(result, Err(KvBlobError::InvalidRequest(_))));
        assert_eq!(faults.put_calls(), 0);
    }

    #[tokio::test]
    async fn storage_failures_map_to_upstream() {
        let store = MemoryKv::new();
        store
            .client()
            .put(Bytes::from_static(b"blob:1"), Bytes::from_static(b"old"))
            .await
            .unwrap();
        let operation = CreateBlobOperation::new(Arc::new(BlobKeyspace::default()));

        let (client, faults) = FaultyKvClient::new(&store);
        Faults::fail(&faults.scan);
        let result = operation.run(&client, create("new")).await;
        assert!(matches!(
            result,
            Err(KvBlobError::Upstream(ref message)) if message == "Failed to retrieve blobs"
        ));

        let (client, faults) = FaultyKvClient::new(&store);
        Faults::fail(&faults.get);
        let result = operation.run(&client, create("new")).await;
        assert!(matches!(
            result,
            Err(KvBlobError::Upstream(ref message)) if message == "Failed to retrieve blob"
        ));

        let (client, faults) = FaultyKvClient::new(&store);
        Faults::fail(&faults.put);
        let result = operation.run(&client, create("new")).await;
        assert!(matches!(
            result,
            Err(KvBlobError::Upstream(ref message)) if message == "Failed to save blob"
        ));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_creates_of_one_value_can_both_succeed() {
        let store = MemoryKv::new();
        let barrier = Arc::new(Barrier::new(2));
        let first = LockstepKvClient {
            inner: store.client(),
            barrier: barrier.clone(),
        };
        let second = LockstepKvClient {
            inner: store.client(),
            barrier,
        };
        let operation = CreateBlobOperation::new(Arc::new(BlobKeyspace::default()));

        let (left, right) = tokio::join!(
            operation.run(&first, create("twin")),
            operation.run(&second, create("twin")),
        );

        assert!(matches!(left, Ok(CreateBlobOperationOutcome::Created(_))));
        assert!(matches!(right, Ok(CreateBlobOperationOutcome::Created(_))));
        assert_eq!(store.len(), 2);
    }
}

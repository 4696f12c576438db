use crate::keyspace::BlobKeyspace;
use crate::kv::RawKvClient;
use crate::locator::find_key_by_value;
use crate::{KvBlobError, Result};
use bytes::Bytes;
use std::sync::Arc;

#[derive(Clone)]
pub struct DeleteBlobOperation {
    keyspace: Arc<BlobKeyspace>,
}

#[derive(Debug, Clone)]
pub struct DeleteBlobOperationRequest {
    pub blob: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteBlobOperationOutcome {
    Deleted { key: Bytes },
    NotFound,
}

impl DeleteBlobOperation {
    pub fn new(keyspace: Arc<BlobKeyspace>) -> Self {
        Self { keyspace }
    }

    pub async fn run(
        &self,
        client: &dyn RawKvClient,
        request: DeleteBlobOperationRequest,
    ) -> Result<DeleteBlobOperationOutcome> {
        let DeleteBlobOperationRequest { blob } = request;

        if blob.is_empty() {
            return Err(KvBlobError::InvalidRequest("No blob provided".to_string()));
        }

        let Some(key) = find_key_by_value(client, &self.keyspace, &blob).await? else {
            return Ok(DeleteBlobOperationOutcome::NotFound);
        };

        client
            .delete(&key)
            .await
            .map_err(|error| KvBlobError::upstream("Failed to delete blob", error))?;

        Ok(DeleteBlobOperationOutcome::Deleted { key })
    }
}

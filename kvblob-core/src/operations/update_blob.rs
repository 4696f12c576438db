use crate::keyspace::BlobKeyspace;
use crate::kv::RawKvClient;
use crate::locator::find_key_by_value;
use crate::{KvBlobError, Result};
use bytes::Bytes;
use std::sync::Arc;

#[derive(Clone)]
pub struct UpdateBlobOperation {
    keyspace: Arc<BlobKeyspace>,
}

#[derive(Debug, Clone)]
pub struct UpdateBlobOperationRequest {
    pub old_blob: Bytes,
    pub new_blob: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBlobOperationResult {
    pub key: Bytes,
    pub blob: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateBlobOperationOutcome {
    Updated(UpdateBlobOperationResult),
    NotFound,
}

impl UpdateBlobOperation {
    pub fn new(keyspace: Arc<BlobKeyspace>) -> Self {
        Self { keyspace }
    }

    /// Replace the value of the first key holding `old_blob`; the key itself is kept.
    pub async fn run(
        &self,
        client: &dyn RawKvClient,
        request: UpdateBlobOperationRequest,
    ) -> Result<UpdateBlobOperationOutcome> {
        let UpdateBlobOperationRequest { old_blob, new_blob } = request;

        if old_blob.is_empty() {
            return Err(KvBlobError::InvalidRequest(
                "No old blob provided".to_string(),
            ));
        }
        if new_blob.is_empty() {
            return Err(KvBlobError::InvalidRequest(
                "No new blob provided".to_string(),
            ));
        }

        let Some(key) = find_key_by_value(client, &self.keyspace, &old_blob).await? else {
            return Ok(UpdateBlobOperationOutcome::NotFound);
        };

        client
            .put(key.clone(), new_blob.clone())
            .await
            .map_err(|error| KvBlobError::upstream("Failed to update blob", error))?;

        Ok(UpdateBlobOperationOutcome::Updated(
            UpdateBlobOperationResult {
                key,
                blob: new_blob,
            },
        ))
    }
}

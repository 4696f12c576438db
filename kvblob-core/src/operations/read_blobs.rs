use crate::keyspace::BlobKeyspace;
use crate::kv::RawKvClient;
use crate::locator::{fetch_all, fetch_value, scan_keys};
use crate::Result;
use bytes::Bytes;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadAction {
    Count,
    All,
    Random,
}

impl ReadAction {
    /// `count` and `all` select themselves; anything else, including an
    /// empty action, reads a random blob.
    pub fn parse(action: &str) -> Self {
        match action {
            "count" => ReadAction::Count,
            "all" => ReadAction::All,
            _ => ReadAction::Random,
        }
    }
}

#[derive(Clone)]
pub struct ReadBlobsOperation {
    keyspace: Arc<BlobKeyspace>,
}

#[derive(Debug, Clone)]
pub struct ReadBlobsOperationRequest {
    pub action: ReadAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadBlobsOperationOutcome {
    Count(usize),
    All(Vec<Bytes>),
    Random(Bytes),
    /// No blobs in the scan window
    Empty,
}

impl ReadBlobsOperation {
    pub fn new(keyspace: Arc<BlobKeyspace>) -> Self {
        Self { keyspace }
    }

    pub async fn run(
        &self,
        client: &dyn RawKvClient,
        request: ReadBlobsOperationRequest,
    ) -> Result<ReadBlobsOperationOutcome> {
        match request.action {
            ReadAction::Count => Ok(ReadBlobsOperationOutcome::Count(self.count(client).await?)),
            ReadAction::All => {
                let blobs = fetch_all(client, &self.keyspace).await?;
                if blobs.is_empty() {
                    return Ok(ReadBlobsOperationOutcome::Empty);
                }
                Ok(ReadBlobsOperationOutcome::All(blobs))
            }
            ReadAction::Random => {
                let keys = scan_keys(client, &self.keyspace).await?;
                if keys.is_empty() {
                    return Ok(ReadBlobsOperationOutcome::Empty);
                }

                let seed = Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64;
                let mut rng = StdRng::seed_from_u64(seed);
                let key = &keys[rng.gen_range(0..keys.len())];

                let blob = fetch_value(client, key).await?;
                Ok(ReadBlobsOperationOutcome::Random(blob))
            }
        }
    }

    /// Number of keys in the scan window
    pub async fn count(&self, client: &dyn RawKvClient) -> Result<usize> {
        Ok(scan_keys(client, &self.keyspace).await?.len())
    }
}

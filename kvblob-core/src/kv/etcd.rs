use crate::error::{KvBlobError, Result};
use crate::kv::{KvPair, RawKvClient};
use async_trait::async_trait;
use bytes::Bytes;
use etcd_client::{Client, GetOptions, SortOrder, SortTarget};

/// etcd-backed raw key-value client
pub struct EtcdKvClient {
    client: Client,
}

impl EtcdKvClient {
    /// Connect a new client to the given endpoints
    pub async fn connect(endpoints: &[String]) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(KvBlobError::Config(
                "etcd endpoints cannot be empty".to_string(),
            ));
        }

        let client = Client::connect(endpoints, None)
            .await
            .map_err(|e| KvBlobError::Upstream(format!("Failed to connect to etcd: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RawKvClient for EtcdKvClient {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        let mut client = self.client.clone();
        let resp = client.get(key.to_vec(), None).await?;

        Ok(resp
            .kvs()
            .first()
            .map(|kv| Bytes::copy_from_slice(kv.value())))
    }

    async fn put(&self, key: Bytes, value: Bytes) -> Result<()> {
        let mut client = self.client.clone();
        client.put(key.to_vec(), value.to_vec(), None).await?;

        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        let mut client = self.client.clone();
        client.delete(key.to_vec(), None).await?;

        Ok(())
    }

    async fn scan(&self, start: &[u8], end: &[u8], limit: usize) -> Result<Vec<KvPair>> {
        // etcd treats a zero limit as unlimited
        if limit == 0 {
            return Ok(Vec::new());
        }

        let options = GetOptions::new()
            .with_range(end.to_vec())
            .with_limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .with_sort(SortTarget::Key, SortOrder::Ascend);

        let mut client = self.client.clone();
        let resp = client.get(start.to_vec(), Some(options)).await?;

        Ok(resp
            .kvs()
            .iter()
            .map(|kv| {
                KvPair::new(
                    Bytes::copy_from_slice(kv.key()),
                    Bytes::copy_from_slice(kv.value()),
                )
            })
            .collect())
    }
}

use super::{DynKvClient, etcd::EtcdKvClient, memory::MemoryKv};
use crate::pool::ClientPool;
use crate::{KvBlobError, Result};

#[derive(Debug, Clone, Default)]
pub struct KvClientBuilder {
    backend: Option<String>,
    pool_size: Option<usize>,
    etcd_endpoints: Option<Vec<String>>,
    memory_store: Option<MemoryKv>,
}

impl KvClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = Some(pool_size);
        self
    }

    pub fn etcd_endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.etcd_endpoints = Some(endpoints);
        self
    }

    /// Share an existing in-memory store instead of starting an empty one
    pub fn memory_store(mut self, store: MemoryKv) -> Self {
        self.memory_store = Some(store);
        self
    }

    fn resolve_backend(&self) -> Result<String> {
        let backend = self
            .backend
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if backend.is_empty() {
            return Err(KvBlobError::Config(
                "storage backend cannot be empty".to_string(),
            ));
        }

        Ok(backend)
    }

    /// Build a single client handle for the configured backend
    pub async fn build_client(&self) -> Result<DynKvClient> {
        let backend = self.resolve_backend()?;

        match backend.as_str() {
            "etcd" => {
                let endpoints: Vec<String> = self
                    .etcd_endpoints
                    .clone()
                    .ok_or_else(|| {
                        KvBlobError::Config(
                            "etcd endpoints are required for etcd backend".to_string(),
                        )
                    })?
                    .into_iter()
                    .map(|endpoint| endpoint.trim().to_string())
                    .filter(|endpoint| !endpoint.is_empty())
                    .collect();

                if endpoints.is_empty() {
                    return Err(KvBlobError::Config(
                        "etcd endpoints cannot be empty for etcd backend".to_string(),
                    ));
                }

                let client = EtcdKvClient::connect(&endpoints).await?;
                Ok(Box::new(client))
            }
            "memory" => {
                let store = self.memory_store.clone().unwrap_or_default();
                Ok(Box::new(store.client()))
            }
            other => Err(KvBlobError::Config(format!(
                "unsupported storage backend: {}",
                other
            ))),
        }
    }

    /// Build a pool of `pool_size` handles; any handle failing to connect aborts the build
    pub async fn build_pool(&self) -> Result<ClientPool> {
        let pool_size = self.pool_size.unwrap_or(crate::pool::DEFAULT_POOL_SIZE);

        // All memory handles must see the same data
        let builder = if self.resolve_backend()? == "memory" && self.memory_store.is_none() {
            self.clone().memory_store(MemoryKv::new())
        } else {
            self.clone()
        };

        let mut clients = Vec::with_capacity(pool_size);
        for index in 0..pool_size {
            let client = builder.build_client().await.map_err(|error| {
                tracing::error!("Failed to create storage client {}: {}", index, error);
                error
            })?;
            clients.push(client);
        }

        tracing::info!(
            "Built client pool: backend={} size={}",
            builder.resolve_backend()?,
            pool_size
        );

        Ok(ClientPool::new(clients))
    }
}

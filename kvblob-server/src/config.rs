use kvblob_core::{
    DEFAULT_KEY_PREFIX, DEFAULT_MONITOR_INTERVAL, DEFAULT_POOL_SIZE, KvBlobError, KvClientBuilder,
    Result,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub blobs: BlobsConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

/// Storage backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    pub etcd: Option<EtcdConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Etcd,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtcdConfig {
    pub endpoints: Vec<String>,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobsConfig {
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for BlobsConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_monitor_enabled")]
    pub enabled: bool,
    #[serde(default = "default_monitor_interval_secs")]
    pub interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: default_monitor_enabled(),
            interval_secs: default_monitor_interval_secs(),
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

fn default_monitor_enabled() -> bool {
    true
}

fn default_monitor_interval_secs() -> u64 {
    DEFAULT_MONITOR_INTERVAL.as_secs()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Append logs to this file in addition to stdout
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}

fn default_log_filter() -> String {
    "kvblob=info".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(path))
            .add_source(
                ::config::Environment::with_prefix("KVBLOB")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| KvBlobError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| KvBlobError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.blobs.key_prefix.trim().is_empty() {
            return Err(KvBlobError::Config(
                "blobs.key_prefix cannot be empty".to_string(),
            ));
        }

        if self.monitor.enabled && self.monitor.interval_secs == 0 {
            return Err(KvBlobError::Config(
                "monitor.interval_secs must be greater than zero".to_string(),
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(KvBlobError::Config(
                "server.request_timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn client_builder(&self) -> KvClientBuilder {
        let builder = KvClientBuilder::new().pool_size(self.storage.pool_size);

        match self.storage.backend {
            StorageBackend::Etcd => {
                let endpoints = self
                    .storage
                    .etcd
                    .as_ref()
                    .map(|cfg| cfg.endpoints.clone())
                    .unwrap_or_default();

                builder.backend("etcd").etcd_endpoints(endpoints)
            }
            StorageBackend::Memory => builder.backend("memory"),
        }
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KvBlobError>;

#[derive(Error, Debug)]
pub enum KvBlobError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Client pool exhausted: {size} handles, none available")]
    PoolExhausted { size: usize },

    #[error("Storage error: {0}")]
    Upstream(String),

    #[error("Storage call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<etcd_client::Error> for KvBlobError {
    fn from(err: etcd_client::Error) -> Self {
        KvBlobError::Upstream(err.to_string())
    }
}

impl KvBlobError {
    /// Collapse a failed storage call into a short client-facing message,
    /// logging the underlying cause.
    pub fn upstream(action: &str, cause: KvBlobError) -> Self {
        tracing::warn!("{}: {}", action, cause);
        KvBlobError::Upstream(action.to_string())
    }
}

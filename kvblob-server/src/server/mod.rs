use crate::config::Config;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get},
};
use kvblob_core::{
    BlobKeyspace, BlobMonitor, ClientPool, CreateBlobOperation, DeleteBlobOperation, KvBlobError,
    ReadBlobsOperation, Result, UpdateBlobOperation,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

mod blobs;
mod types;

use blobs::dispatch_blob_request;
pub(crate) use types::*;

pub struct ServerState {
    pub(crate) pool: ClientPool,
    pub(crate) request_timeout: Duration,
    pub(crate) read_blobs_operation: Arc<ReadBlobsOperation>,
    pub(crate) create_blob_operation: Arc<CreateBlobOperation>,
    pub(crate) update_blob_operation: Arc<UpdateBlobOperation>,
    pub(crate) delete_blob_operation: Arc<DeleteBlobOperation>,
}

impl ServerState {
    pub fn new(pool: ClientPool, keyspace: Arc<BlobKeyspace>, request_timeout: Duration) -> Self {
        Self {
            pool,
            request_timeout,
            read_blobs_operation: Arc::new(ReadBlobsOperation::new(keyspace.clone())),
            create_blob_operation: Arc::new(CreateBlobOperation::new(keyspace.clone())),
            update_blob_operation: Arc::new(UpdateBlobOperation::new(keyspace.clone())),
            delete_blob_operation: Arc::new(DeleteBlobOperation::new(keyspace)),
        }
    }
}

pub async fn run_server(config: Config) -> Result<()> {
    let pool = config.client_builder().build_pool().await?;
    let keyspace = Arc::new(BlobKeyspace::new(config.blobs.key_prefix.clone()));

    if config.monitor.enabled {
        let (monitor, _counts) = BlobMonitor::new(
            pool.clone(),
            ReadBlobsOperation::new(keyspace.clone()),
            config.monitor.interval(),
        );
        monitor.spawn();
    }

    let state = Arc::new(ServerState::new(
        pool,
        keyspace,
        config.server.request_timeout(),
    ));
    let app = build_router(state);

    let listener = TcpListener::bind(&config.server.bind_addr).await?;
    tracing::info!("kvblob listening on {}", config.server.bind_addr);

    axum::serve(listener, app)
        .await
        .map_err(|error| KvBlobError::Http(error.to_string()))?;

    Ok(())
}

pub(crate) fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", any(dispatch_blob_request))
        .with_state(state)
}

async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        pool_size: state.pool.size(),
        pool_available: state.pool.available(),
    })
}

pub(crate) fn json_ok<T: Serialize>(payload: T) -> Response {
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) fn response_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Translate a failed request into its status code and short message
pub(crate) fn error_response(error: KvBlobError) -> Response {
    tracing::warn!("Request failed: {}", error);

    match error {
        KvBlobError::InvalidRequest(message) => response_error(StatusCode::BAD_REQUEST, message),
        KvBlobError::NotFound(message) => response_error(StatusCode::NOT_FOUND, message),
        KvBlobError::Conflict(message) => response_error(StatusCode::CONFLICT, message),
        KvBlobError::MethodNotAllowed(_) => {
            response_error(StatusCode::METHOD_NOT_ALLOWED, "Invalid request method")
        }
        KvBlobError::Upstream(message) => {
            response_error(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
        KvBlobError::Timeout(_) => {
            response_error(StatusCode::INTERNAL_SERVER_ERROR, "Request timed out")
        }
        _ => response_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
    }
}

use super::{
    BlobQuery, BlobResponse, BlobsResponse, CountResponse, MessageResponse, ServerState,
    error_response, json_ok, response_error,
};
use axum::{
    extract::{RawQuery, State},
    http::{Method, StatusCode},
    response::Response,
};
use bytes::Bytes;
use kvblob_core::{
    CreateBlobOperationOutcome, CreateBlobOperationRequest, DeleteBlobOperationOutcome,
    DeleteBlobOperationRequest, KvBlobError, RawKvClient, ReadAction, ReadBlobsOperationOutcome,
    ReadBlobsOperationRequest, Result, UpdateBlobOperationOutcome, UpdateBlobOperationRequest,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Single entry point for `/`: check out a client, route by method, release.
///
/// The client guard lives for the whole dispatch, so it is returned to the
/// pool on every exit path, including a dropped (cancelled) request.
pub(crate) async fn dispatch_blob_request(
    State(state): State<Arc<ServerState>>,
    method: Method,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let client = match state.pool.try_acquire() {
        Ok(client) => client,
        Err(error) => {
            tracing::error!("Internal server error: {}", error);
            return response_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    let query = BlobQuery::parse(raw_query.as_deref());

    match method {
        Method::GET => handle_get(&state, &*client, query).await,
        Method::POST => handle_post(&state, &*client, query).await,
        Method::PUT => handle_put(&state, &*client, query).await,
        Method::DELETE => handle_delete(&state, &*client, query).await,
        other => error_response(KvBlobError::MethodNotAllowed(other.to_string())),
    }
}

async fn with_timeout<T>(
    timeout: Duration,
    operation: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, operation)
        .await
        .map_err(|_| KvBlobError::Timeout(timeout))?
}

fn lossy(blob: &Bytes) -> String {
    String::from_utf8_lossy(blob).into_owned()
}

async fn handle_get(state: &ServerState, client: &dyn RawKvClient, query: BlobQuery) -> Response {
    let action = lossy(&query.action.unwrap_or_default());
    tracing::info!("Action: {}", action);

    let request = ReadBlobsOperationRequest {
        action: ReadAction::parse(&action),
    };

    let outcome = with_timeout(
        state.request_timeout,
        state.read_blobs_operation.run(client, request),
    )
    .await;

    match outcome {
        Ok(ReadBlobsOperationOutcome::Count(count)) => json_ok(CountResponse { count }),
        Ok(ReadBlobsOperationOutcome::All(blobs)) => json_ok(BlobsResponse {
            blobs: blobs.iter().map(lossy).collect(),
        }),
        Ok(ReadBlobsOperationOutcome::Random(blob)) => json_ok(BlobResponse {
            blob: lossy(&blob),
        }),
        Ok(ReadBlobsOperationOutcome::Empty) => {
            error_response(KvBlobError::NotFound("No blobs found".to_string()))
        }
        Err(error) => error_response(error),
    }
}

async fn handle_post(state: &ServerState, client: &dyn RawKvClient, query: BlobQuery) -> Response {
    let request = CreateBlobOperationRequest {
        blob: query.blob.unwrap_or_default(),
    };

    let outcome = with_timeout(
        state.request_timeout,
        state.create_blob_operation.run(client, request),
    )
    .await;

    match outcome {
        Ok(CreateBlobOperationOutcome::Created(result)) => json_ok(BlobResponse {
            blob: lossy(&result.blob),
        }),
        Ok(CreateBlobOperationOutcome::Duplicate) => {
            error_response(KvBlobError::Conflict("Blob already exists".to_string()))
        }
        Err(error) => error_response(error),
    }
}

async fn handle_put(state: &ServerState, client: &dyn RawKvClient, query: BlobQuery) -> Response {
    let request = UpdateBlobOperationRequest {
        old_blob: query.old_blob.unwrap_or_default(),
        new_blob: query.new_blob.unwrap_or_default(),
    };

    let outcome = with_timeout(
        state.request_timeout,
        state.update_blob_operation.run(client, request),
    )
    .await;

    match outcome {
        Ok(UpdateBlobOperationOutcome::Updated(result)) => json_ok(BlobResponse {
            blob: lossy(&result.blob),
        }),
        Ok(UpdateBlobOperationOutcome::NotFound) => {
            error_response(KvBlobError::NotFound("Blob not found".to_string()))
        }
        Err(error) => error_response(error),
    }
}

async fn handle_delete(
    state: &ServerState,
    client: &dyn RawKvClient,
    query: BlobQuery,
) -> Response {
    let request = DeleteBlobOperationRequest {
        blob: query.blob.unwrap_or_default(),
    };

    let outcome = with_timeout(
        state.request_timeout,
        state.delete_blob_operation.run(client, request),
    )
    .await;

    match outcome {
        Ok(DeleteBlobOperationOutcome::Deleted { .. }) => json_ok(MessageResponse {
            message: "Blob deleted successfully".to_string(),
        }),
        Ok(DeleteBlobOperationOutcome::NotFound) => {
            error_response(KvBlobError::NotFound("Blob not found".to_string()))
        }
        Err(error) => error_response(error),
    }
}

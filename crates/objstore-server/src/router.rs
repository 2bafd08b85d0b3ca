use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use objstore_codec::{ObjectCodec, WireEncode};
use objstore_types::{
    BatchReadObjectRequest, DeleteObjectRequest, ObjectHistoryRequest, ObjectSearchRequest,
    ReadObjectRequest, WriteObjectRequest,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthProvider, Credentials, Identity};
use crate::error::{ServiceError, ServiceResult};
use crate::service::ObjectStoreService;

pub const READ_PATH: &str = "/object.ObjectStore/Read";
pub const BATCH_READ_PATH: &str = "/object.ObjectStore/BatchRead";
pub const WRITE_PATH: &str = "/object.ObjectStore/Write";
pub const DELETE_PATH: &str = "/object.ObjectStore/Delete";
pub const HISTORY_PATH: &str = "/object.ObjectStore/History";
pub const SEARCH_PATH: &str = "/object.ObjectStore/Search";
pub const HEALTH_PATH: &str = "/v1/health";

/// Shared state for the RPC handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn ObjectStoreService>,
    pub auth: Arc<dyn AuthProvider>,
}

/// Build the axum router with all object store endpoints.
pub fn build_router(state: AppState, permissive_cors: bool) -> Router {
    let router = Router::new()
        .route(HEALTH_PATH, get(health_handler))
        .route(READ_PATH, post(read_handler))
        .route(BATCH_READ_PATH, post(batch_read_handler))
        .route(WRITE_PATH, post(write_handler))
        .route(DELETE_PATH, post(delete_handler))
        .route(HISTORY_PATH, post(history_handler))
        .route(SEARCH_PATH, post(search_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http());
    if permissive_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Encode a response record as the HTTP body.
fn encoded<T: WireEncode>(value: &T) -> Response {
    match ObjectCodec::encode(value) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) => ServiceError::from(err).into_response(),
    }
}

async fn caller(state: &AppState, headers: &HeaderMap) -> ServiceResult<Identity> {
    let authorization = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    state.auth.authenticate(&Credentials::from_authorization(authorization)).await
}

/// Authenticate, parse the request, run `call`, and encode the result.
async fn dispatch<Req, Resp, F, Fut>(
    state: AppState,
    headers: HeaderMap,
    body: Bytes,
    call: F,
) -> Response
where
    Req: DeserializeOwned,
    Resp: WireEncode,
    F: FnOnce(Arc<dyn ObjectStoreService>, Identity, Req) -> Fut,
    Fut: Future<Output = ServiceResult<Resp>>,
{
    let identity = match caller(&state, &headers).await {
        Ok(identity) => identity,
        Err(err) => return err.into_response(),
    };
    let request: Req = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => return ServiceError::InvalidInput(err.to_string()).into_response(),
    };
    match call(state.service, identity, request).await {
        Ok(response) => encoded(&response),
        Err(err) => err.into_response(),
    }
}

async fn read_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    dispatch(state, headers, body, |svc, id, req: ReadObjectRequest| async move {
        svc.read(&id, req).await
    })
    .await
}

async fn batch_read_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    dispatch(state, headers, body, |svc, id, req: BatchReadObjectRequest| async move {
        svc.batch_read(&id, req).await
    })
    .await
}

async fn write_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    dispatch(state, headers, body, |svc, id, req: WriteObjectRequest| async move {
        Ok(svc.write(&id, req).await)
    })
    .await
}

async fn delete_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    dispatch(state, headers, body, |svc, id, req: DeleteObjectRequest| async move {
        Ok(svc.delete(&id, req).await)
    })
    .await
}

async fn history_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    dispatch(state, headers, body, |svc, id, req: ObjectHistoryRequest| async move {
        svc.history(&id, req).await
    })
    .await
}

async fn search_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    dispatch(state, headers, body, |svc, id, req: ObjectSearchRequest| async move {
        svc.search(&id, req).await
    })
    .await
}

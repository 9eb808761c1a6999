// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP transport for the admin API, built on axum.
//!
//! Serves `GET /health` and `POST /api/rpc` with permissive CORS and panic
//! recovery; a panic inside a method surfaces as a plain 500 instead of
//! taking the process down.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use tgrelay_config::ServiceConfig;
use tgrelay_core::RelayError;

use crate::RpcHandler;
use crate::envelope::{PARSE_ERROR, RpcRequest, RpcResponse};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct RpcState {
    pub handler: Arc<RpcHandler>,
}

/// Build the admin API router.
pub fn router(handler: Arc<RpcHandler>, debug: bool) -> Router {
    let state = RpcState { handler };
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/api/rpc", post(handle_rpc))
        .with_state(state)
        .layer(CatchPanicLayer::new())
        .layer(CorsLayer::permissive());

    if debug {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

/// Bind and serve the admin API until the cancellation token fires.
pub async fn serve(
    config: &ServiceConfig,
    handler: Arc<RpcHandler>,
    cancel: CancellationToken,
) -> Result<(), RelayError> {
    let app = router(handler, config.debug);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RelayError::Http(format!("failed to bind {addr}: {e}")))?;

    info!(%addr, "admin API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| RelayError::Http(format!("server error: {e}")))?;

    Ok(())
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// POST /api/rpc
///
/// The body is read raw so a malformed payload can be answered with a
/// JSON-RPC parse error rather than a bare HTTP rejection.
pub async fn handle_rpc(State(state): State<RpcState>, body: Bytes) -> Json<RpcResponse> {
    let request: RpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return Json(RpcResponse::failure(
                Value::Null,
                PARSE_ERROR,
                format!("parse error: {e}"),
            ));
        }
    };

    Json(state.handler.dispatch(request).await)
}

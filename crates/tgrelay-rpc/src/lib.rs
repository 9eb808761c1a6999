// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON-RPC 2.0 admin surface for the tgrelay forwarder.
//!
//! Methods are registered into an [`RpcHandler`] and served over a single
//! `POST /api/rpc` endpoint by [`server`]. Rule methods mutate the store,
//! reload the engine's index synchronously, and kick off backfills
//! asynchronously; telegram methods proxy the outbound client for
//! rule-authoring UIs.

pub mod envelope;
pub mod methods;
pub mod server;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use tgrelay_core::RelayError;
use tgrelay_engine::Engine;
use tgrelay_storage::Database;

use envelope::{EXECUTION_ERROR, INVALID_REQUEST, METHOD_NOT_FOUND, RpcRequest, RpcResponse};

/// One named RPC method.
#[async_trait]
pub trait RpcMethod: Send + Sync {
    /// The wire name, e.g. `rules.create`.
    fn name(&self) -> &'static str;

    /// Execute with the request's `params` member (null when absent).
    async fn execute(&self, params: Value) -> Result<Value, RelayError>;
}

/// Registry and dispatcher for RPC methods.
#[derive(Default)]
pub struct RpcHandler {
    methods: HashMap<&'static str, Box<dyn RpcMethod>>,
}

impl RpcHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, method: Box<dyn RpcMethod>) {
        self.methods.insert(method.name(), method);
    }

    /// Dispatch one request to its method and wrap the outcome in a
    /// response envelope.
    pub async fn dispatch(&self, request: RpcRequest) -> RpcResponse {
        if request.jsonrpc != "2.0" {
            return RpcResponse::failure(
                request.id,
                INVALID_REQUEST,
                format!("unsupported jsonrpc version: `{}`", request.jsonrpc),
            );
        }

        let Some(method) = self.methods.get(request.method.as_str()) else {
            return RpcResponse::failure(
                request.id,
                METHOD_NOT_FOUND,
                format!("method not found: {}", request.method),
            );
        };

        debug!(method = request.method, "dispatching rpc request");
        match method.execute(request.params).await {
            Ok(result) => RpcResponse::success(request.id, result),
            Err(e) => RpcResponse::failure(request.id, EXECUTION_ERROR, e.to_string()),
        }
    }
}

/// Build the handler with the full admin method set registered.
pub fn admin_handler(db: Database, engine: Engine) -> RpcHandler {
    let mut handler = RpcHandler::new();

    handler.register(Box::new(methods::rules::RulesCreate::new(
        db.clone(),
        engine.clone(),
    )));
    handler.register(Box::new(methods::rules::RulesList::new(db.clone())));
    handler.register(Box::new(methods::rules::RulesUpdate::new(
        db.clone(),
        engine.clone(),
    )));
    handler.register(Box::new(methods::rules::RulesDelete::new(
        db.clone(),
        engine.clone(),
    )));
    handler.register(Box::new(methods::rules::RulesEnable::new(
        db,
        engine.clone(),
    )));

    handler.register(Box::new(methods::telegram::MessagesHistory::new(
        engine.clone(),
    )));
    handler.register(Box::new(methods::telegram::DialogsList::new(
        engine.clone(),
    )));
    handler.register(Box::new(methods::telegram::ChannelsList::new(engine)));

    handler
}

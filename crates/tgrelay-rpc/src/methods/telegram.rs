// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-proxy methods for rule-authoring UIs: message history and the
//! account's dialog list.
//!
//! These go through the engine's client accessor, so before the client is
//! wired they fail with the recoverable "telegram client not ready" error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tgrelay_core::{DialogKind, InputChannelPeer, RelayError};
use tgrelay_engine::Engine;

use crate::RpcMethod;
use crate::methods::{decode_params, to_result};

const DEFAULT_HISTORY_LIMIT: usize = 20;
const MAX_HISTORY_LIMIT: usize = 100;
const DEFAULT_DIALOGS_LIMIT: usize = 50;
const CHANNELS_SCAN_LIMIT: usize = 100;

// --- messages.history ---

pub struct MessagesHistory {
    engine: Engine,
}

impl MessagesHistory {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesHistoryParams {
    #[serde(default)]
    peer_id: i64,
    #[serde(default)]
    access_hash: i64,
    #[serde(default)]
    limit: usize,
}

/// One history entry in the response.
#[derive(Debug, Serialize)]
struct MessageInfo {
    id: i32,
    text: String,
}

#[async_trait]
impl RpcMethod for MessagesHistory {
    fn name(&self) -> &'static str {
        "messages.history"
    }

    async fn execute(&self, params: Value) -> Result<Value, RelayError> {
        let mut p: MessagesHistoryParams = decode_params(params)?;
        if p.peer_id == 0 {
            return Err(RelayError::InvalidParams("peer_id is required".into()));
        }
        if p.limit == 0 || p.limit > MAX_HISTORY_LIMIT {
            p.limit = DEFAULT_HISTORY_LIMIT;
        }

        let api = self.engine.lifecycle().try_api()?;
        let messages = api
            .get_history(
                InputChannelPeer {
                    channel_id: p.peer_id,
                    access_hash: p.access_hash,
                },
                p.limit,
            )
            .await?;

        let result: Vec<MessageInfo> = messages
            .into_iter()
            .map(|m| MessageInfo {
                id: m.id,
                text: m.text,
            })
            .collect();
        to_result(result)
    }
}

// --- dialogs.list ---

pub struct DialogsList {
    engine: Engine,
}

impl DialogsList {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}

#[derive(Debug, Deserialize, Default)]
struct DialogsListParams {
    #[serde(default)]
    limit: usize,
}

#[async_trait]
impl RpcMethod for DialogsList {
    fn name(&self) -> &'static str {
        "dialogs.list"
    }

    async fn execute(&self, params: Value) -> Result<Value, RelayError> {
        let p: DialogsListParams = if params.is_null() {
            DialogsListParams::default()
        } else {
            decode_params(params)?
        };
        let limit = if p.limit == 0 {
            DEFAULT_DIALOGS_LIMIT
        } else {
            p.limit
        };

        let api = self.engine.lifecycle().try_api()?;
        let dialogs = api.get_dialogs(limit).await?;
        to_result(dialogs)
    }
}

// --- channels.list ---

pub struct ChannelsList {
    engine: Engine,
}

impl ChannelsList {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl RpcMethod for ChannelsList {
    fn name(&self) -> &'static str {
        "channels.list"
    }

    async fn execute(&self, _params: Value) -> Result<Value, RelayError> {
        let api = self.engine.lifecycle().try_api()?;
        let dialogs = api.get_dialogs(CHANNELS_SCAN_LIMIT).await?;
        let channels: Vec<_> = dialogs
            .into_iter()
            .filter(|d| d.kind == DialogKind::Channel)
            .collect();
        to_result(channels)
    }
}

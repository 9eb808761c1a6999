// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock Telegram API for deterministic testing.
//!
//! `MockTelegramApi` implements [`TelegramApi`] with scripted history and
//! dialog responses, captured outbound forwards for assertions, and failure
//! injection for both directions.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use tgrelay_core::{
    ChannelMessage, DialogInfo, ForwardRequest, InputChannelPeer, RelayError, TelegramApi,
};

/// One captured outbound forward, with the (virtual) time it happened.
#[derive(Debug, Clone)]
pub struct RecordedForward {
    pub request: ForwardRequest,
    pub at: Instant,
}

/// A scripted stand-in for the external Telegram client.
#[derive(Default)]
pub struct MockTelegramApi {
    history: Mutex<HashMap<i64, Vec<ChannelMessage>>>,
    dialogs: Mutex<Vec<DialogInfo>>,
    forwards: Mutex<Vec<RecordedForward>>,
    fail_forwards: AtomicBool,
    fail_history: AtomicBool,
}

impl MockTelegramApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor returning the `Arc` the engine wants.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Script the history of a channel. Telegram convention: newest first.
    pub async fn set_history(&self, channel_id: i64, messages: Vec<ChannelMessage>) {
        self.history.lock().await.insert(channel_id, messages);
    }

    /// Script the account's dialog list.
    pub async fn set_dialogs(&self, dialogs: Vec<DialogInfo>) {
        *self.dialogs.lock().await = dialogs;
    }

    /// All forwards captured so far, in call order.
    pub async fn forwards(&self) -> Vec<RecordedForward> {
        self.forwards.lock().await.clone()
    }

    /// Number of forwards captured so far.
    pub async fn forward_count(&self) -> usize {
        self.forwards.lock().await.len()
    }

    /// Make subsequent `forward_messages` calls fail.
    pub fn set_fail_forwards(&self, fail: bool) {
        self.fail_forwards.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `get_history` calls fail.
    pub fn set_fail_history(&self, fail: bool) {
        self.fail_history.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TelegramApi for MockTelegramApi {
    async fn get_history(
        &self,
        peer: InputChannelPeer,
        limit: usize,
    ) -> Result<Vec<ChannelMessage>, RelayError> {
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(RelayError::telegram("history fetch failed (injected)"));
        }
        let mut messages = self
            .history
            .lock()
            .await
            .get(&peer.channel_id)
            .cloned()
            .unwrap_or_default();
        messages.truncate(limit);
        Ok(messages)
    }

    async fn forward_messages(&self, request: ForwardRequest) -> Result<(), RelayError> {
        if self.fail_forwards.load(Ordering::SeqCst) {
            return Err(RelayError::telegram("forward failed (injected)"));
        }
        self.forwards.lock().await.push(RecordedForward {
            request,
            at: Instant::now(),
        });
        Ok(())
    }

    async fn get_dialogs(&self, limit: usize) -> Result<Vec<DialogInfo>, RelayError> {
        let mut dialogs = self.dialogs.lock().await.clone();
        dialogs.truncate(limit);
        Ok(dialogs)
    }
}

// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine test harness: temp SQLite database, a wired mock client, and
//! helpers for building rules, messages, and envelopes.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use tgrelay_core::{ChannelMessage, ForwardRule, Peer, TelegramUpdate, UpdatesEnvelope};
use tgrelay_engine::Engine;
use tgrelay_storage::{Database, NewForwardRule, queries};

use crate::mock_api::MockTelegramApi;

/// An engine wired to a mock client over a temp database.
///
/// The temp directory lives as long as the harness; dropping the harness
/// removes the database.
pub struct EngineHarness {
    pub db: Database,
    pub engine: Engine,
    pub api: Arc<MockTelegramApi>,
    pub cancel: CancellationToken,
    _dir: TempDir,
}

impl EngineHarness {
    /// Build a harness with the mock client already wired.
    pub async fn new() -> Self {
        let harness = Self::new_unwired().await;
        harness.engine.lifecycle().wire(harness.api.clone());
        harness
    }

    /// Build a harness whose engine has no client wired yet, for exercising
    /// the "client not ready" paths.
    pub async fn new_unwired() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("harness.db");
        let db = Database::open(path.to_str().expect("utf-8 temp path"))
            .await
            .expect("open database");
        let cancel = CancellationToken::new();
        let engine = Engine::new(db.clone(), cancel.clone());
        let api = MockTelegramApi::shared();
        Self {
            db,
            engine,
            api,
            cancel,
            _dir: dir,
        }
    }

    /// Insert an enabled rule and reload the engine's index.
    pub async fn create_rule(&self, source: i64, target: i64, pattern: &str) -> ForwardRule {
        let rule = queries::rules::create(
            &self.db,
            NewForwardRule {
                source_channel_id: source,
                source_name: format!("src-{source}"),
                source_hash: source,
                target_channel_id: target,
                target_name: format!("dst-{target}"),
                target_hash: target,
                match_pattern: pattern.to_string(),
                enabled: true,
            },
        )
        .await
        .expect("create rule");
        self.engine.reload_rules().await.expect("reload rules");
        rule
    }
}

/// A text message posted in a channel.
pub fn channel_message(id: i32, channel_id: i64, text: &str) -> ChannelMessage {
    ChannelMessage {
        id,
        text: text.to_string(),
        peer: Peer::Channel { channel_id },
    }
}

/// Wrap one message as a single-update envelope.
pub fn single(msg: ChannelMessage) -> UpdatesEnvelope {
    UpdatesEnvelope::Single(TelegramUpdate::NewChannelMessage(msg))
}

/// Wrap messages as a batch envelope.
pub fn batch(msgs: Vec<ChannelMessage>) -> UpdatesEnvelope {
    UpdatesEnvelope::Batch(
        msgs.into_iter()
            .map(TelegramUpdate::NewChannelMessage)
            .collect(),
    )
}

/// Poll until the mock has captured at least `count` forwards.
///
/// Designed for `#[tokio::test(start_paused = true)]`: the polling sleeps
/// auto-advance virtual time, so paced forwards arrive without real waiting.
pub async fn wait_for_forwards(api: &MockTelegramApi, count: usize) {
    tokio::time::timeout(Duration::from_secs(3600), async {
        loop {
            if api.forward_count().await >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {count} forwards"));
}

/// Poll until the forward log contains `(rule_id, message_id)`.
pub async fn wait_until_logged(db: &Database, rule_id: i64, message_id: i32) {
    tokio::time::timeout(Duration::from_secs(3600), async {
        loop {
            if queries::logs::exists(db, rule_id, message_id)
                .await
                .unwrap_or(false)
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for log ({rule_id}, {message_id})"));
}

/// Give spawned workers a beat to finish whatever they will ever do.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

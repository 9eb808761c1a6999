// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update dispatcher: consumes upstream envelopes and fans matches out to
//! forward workers.
//!
//! The dispatcher runs inline on the client's update-delivery task, so it
//! must never block on outbound I/O: each matching (rule, message) pair is
//! handed to a spawned worker. A single bad rule or transient store failure
//! skips just that match and never stops dispatch for other rules.

use async_trait::async_trait;
use tgrelay_core::{
    ChannelMessage, RelayError, TelegramUpdate, UpdateHandler, UpdatesEnvelope,
};
use tgrelay_storage::queries::logs;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::Engine;

#[async_trait]
impl UpdateHandler for Engine {
    /// Process one update envelope from the upstream client.
    ///
    /// Recognizes the batch and single-update shapes; within them, only new
    /// channel messages are processed. After shutdown this is a no-op.
    async fn handle(&self, envelope: UpdatesEnvelope) -> Result<(), RelayError> {
        if self.lifecycle().is_cancelled() {
            return Ok(());
        }

        match envelope {
            UpdatesEnvelope::Batch(updates) => {
                for update in updates {
                    if let TelegramUpdate::NewChannelMessage(msg) = update {
                        self.dispatch_message(msg).await;
                    }
                }
            }
            UpdatesEnvelope::Single(TelegramUpdate::NewChannelMessage(msg)) => {
                self.dispatch_message(msg).await;
            }
            UpdatesEnvelope::Single(_) => {}
        }
        Ok(())
    }
}

impl Engine {
    /// Run one channel message through the decision pipeline of every rule
    /// listening on its channel: pattern filter, durable dedup, rate limit,
    /// then hand-off to a spawned forward worker.
    async fn dispatch_message(&self, msg: ChannelMessage) {
        let Some(channel_id) = msg.channel_id() else {
            return;
        };
        if msg.text.is_empty() {
            return;
        }

        let snapshot = self.index().snapshot();
        for entry in snapshot.for_channel(channel_id) {
            if !entry.pattern.is_match(&msg.text) {
                continue;
            }

            // Durable dedup comes before the rate limit so a duplicate can
            // never reset the rate-limit window.
            match logs::exists(self.database(), entry.rule.id, msg.id).await {
                Ok(true) => {
                    debug!(
                        rule_id = entry.rule.id,
                        message_id = msg.id,
                        "message already forwarded, skipping (dedup)"
                    );
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    // Unknown dedup state: forwarding could duplicate, so skip.
                    warn!(
                        rule_id = entry.rule.id,
                        message_id = msg.id,
                        error = %e,
                        "dedup check failed, skipping message for this rule"
                    );
                    continue;
                }
            }

            if entry.time_until_allowed(Instant::now()).is_some() {
                info!(
                    rule_id = entry.rule.id,
                    message_id = msg.id,
                    "rate limit hit, skipping forward"
                );
                continue;
            }

            info!(
                source = entry.rule.source_channel_id,
                target = entry.rule.target_channel_id,
                rule_id = entry.rule.id,
                pattern = %entry.rule.match_pattern,
                "forwarding message"
            );

            let engine = self.clone();
            let rule = entry.rule.clone();
            let message_id = msg.id;
            tokio::spawn(async move {
                engine.forward_now(&rule, message_id).await;
            });
        }
    }
}

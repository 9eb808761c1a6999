// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Forward worker: one outbound forward attempt plus its bookkeeping.
//!
//! Both the realtime dispatcher and the backfill runner funnel through
//! [`Engine::forward_now`], so dedup logging and the per-rule rate-limit
//! clock behave identically for either path.

use tgrelay_core::{ForwardRequest, ForwardRule};
use tgrelay_storage::queries::logs;
use tgrelay_storage::{LogInsert, NewForwardLog};
use tracing::{debug, error};

use crate::Engine;

impl Engine {
    /// Execute a single (rule, message) forward.
    ///
    /// On outbound failure nothing is recorded: no log row, no rate-limit
    /// advance, so the message stays eligible for retry on the next matching
    /// update. On success the forward log is inserted (a unique violation is
    /// benign: a concurrent path won the race) and the rule's last-forward
    /// clock advances.
    pub async fn forward_now(&self, rule: &ForwardRule, message_id: i32) {
        if self.lifecycle().is_cancelled() {
            debug!(
                rule_id = rule.id,
                message_id, "shutdown in progress, dropping forward"
            );
            return;
        }

        let api = match self.lifecycle().try_api() {
            Ok(api) => api,
            Err(_) => {
                error!(
                    rule_id = rule.id,
                    message_id, "telegram client not ready, cannot forward"
                );
                return;
            }
        };

        // Fresh random nonce per call: the platform dedups client retries by
        // this id, and deriving it from the message id would collide across
        // rules forwarding the same message.
        let request = ForwardRequest {
            from_peer: rule.source_peer(),
            to_peer: rule.target_peer(),
            ids: vec![message_id],
            random_ids: vec![rand::random::<i64>()],
        };

        if let Err(e) = api.forward_messages(request).await {
            error!(
                source = rule.source_channel_id,
                target = rule.target_channel_id,
                message_id,
                error = %e,
                "failed to forward message"
            );
            return;
        }

        let log = NewForwardLog {
            rule_id: rule.id,
            message_id,
            source_channel_id: rule.source_channel_id,
            target_channel_id: rule.target_channel_id,
        };
        match logs::insert(self.database(), log).await {
            Ok(LogInsert::Inserted) => {}
            Ok(LogInsert::Duplicate) => {
                debug!(
                    rule_id = rule.id,
                    message_id, "forward already logged by a concurrent path"
                );
            }
            Err(e) => {
                error!(
                    rule_id = rule.id,
                    message_id,
                    error = %e,
                    "failed to record forward log"
                );
            }
        }

        self.index().mark_forwarded(rule.id);
    }
}

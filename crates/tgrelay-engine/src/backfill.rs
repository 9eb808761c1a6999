// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backfill runner: bounded sweep of recent source-channel history when a
//! rule becomes active.
//!
//! Fetches the newest messages once, filters them the same way the realtime
//! path does, then forwards survivors oldest-first, pacing on the rule's
//! shared last-forward clock so backfill and realtime traffic together stay
//! within one forward per rule per minute. Shutdown is observed at every
//! wait.

use regex::Regex;
use tgrelay_core::ForwardRule;
use tgrelay_storage::queries::logs;
use tracing::{debug, error, info, warn};

use crate::Engine;

/// How many recent messages a backfill considers.
pub const HISTORY_FETCH_LIMIT: usize = 50;

impl Engine {
    /// Start a backfill for `rule` in the background.
    pub fn spawn_backfill(&self, rule: ForwardRule) {
        let engine = self.clone();
        tokio::spawn(async move {
            engine.run_backfill(rule).await;
        });
    }

    /// Run one backfill to completion on the current task.
    pub async fn run_backfill(&self, rule: ForwardRule) {
        let rule_id = rule.id;
        let cancel = self.lifecycle().cancel_token();

        let api = match self.lifecycle().try_api() {
            Ok(api) => api,
            Err(_) => {
                error!(rule_id, "backfill: telegram client not ready");
                return;
            }
        };

        let history = match api
            .get_history(rule.source_peer(), HISTORY_FETCH_LIMIT)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                error!(rule_id, error = %e, "backfill: failed to fetch message history");
                return;
            }
        };

        let pattern = match Regex::new(&rule.match_pattern) {
            Ok(re) => re,
            Err(e) => {
                error!(rule_id, error = %e, "backfill: failed to compile pattern");
                return;
            }
        };

        // History arrives newest first; walk it backwards so forwards go out
        // chronological.
        let mut matched = Vec::new();
        for msg in history.iter().rev() {
            if msg.text.is_empty() || !pattern.is_match(&msg.text) {
                continue;
            }
            match logs::exists(self.database(), rule_id, msg.id).await {
                Ok(true) => {
                    debug!(rule_id, message_id = msg.id, "backfill: already forwarded, skipping");
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(rule_id, message_id = msg.id, error = %e, "backfill: dedup check failed, skipping");
                    continue;
                }
            }
            matched.push(msg.clone());
        }

        if matched.is_empty() {
            info!(rule_id, "backfill: no new matching messages found");
            return;
        }

        info!(rule_id, count = matched.len(), "starting backfill");

        for msg in matched {
            // Wait out the rule's rate budget. The clock is shared with the
            // realtime path, so an interleaved realtime forward pushes the
            // next backfill send out too.
            loop {
                let Some(wait) = self.index().time_until_allowed(rule_id) else {
                    break;
                };
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = cancel.cancelled() => {
                        info!(rule_id, "backfill: cancelled by shutdown");
                        return;
                    }
                }
            }
            if cancel.is_cancelled() {
                info!(rule_id, "backfill: cancelled by shutdown");
                return;
            }

            // Re-check right before sending to absorb races against the
            // realtime dispatcher.
            match logs::exists(self.database(), rule_id, msg.id).await {
                Ok(true) => {
                    debug!(rule_id, message_id = msg.id, "backfill: already forwarded (race), skipping");
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(rule_id, message_id = msg.id, error = %e, "backfill: dedup check failed, skipping");
                    continue;
                }
            }

            info!(rule_id, message_id = msg.id, "backfill: forwarding message");
            self.forward_now(&rule, msg.id).await;
        }

        info!(rule_id, "backfill complete");
    }
}

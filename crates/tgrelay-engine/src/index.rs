// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory, read-optimized view of the enabled rule set.
//!
//! The index is a copy-on-write snapshot behind an atomic pointer swap:
//! readers clone the current `Arc<IndexSnapshot>` and iterate it without
//! holding any lock, while a reload builds a complete replacement snapshot
//! and swaps it in. A dispatcher invocation therefore observes either the
//! whole old rule set or the whole new one, never a mixture.
//!
//! Per-rule last-forward timestamps live inside the snapshot entries, so a
//! reload resets every rule's rate-limit clock along with the rule set.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use regex::Regex;
use tgrelay_core::ForwardRule;
use tokio::time::Instant;
use tracing::warn;

/// Minimum spacing between two forwards of the same rule.
pub const FORWARD_COOLDOWN: Duration = Duration::from_secs(60);

/// One enabled rule in the active set: the rule snapshot, its compiled
/// pattern, and the time of its most recent forward.
pub struct IndexEntry {
    pub rule: ForwardRule,
    pub pattern: Regex,
    last_forward: Mutex<Option<Instant>>,
}

impl IndexEntry {
    fn new(rule: ForwardRule, pattern: Regex) -> Self {
        Self {
            rule,
            pattern,
            last_forward: Mutex::new(None),
        }
    }

    /// Remaining cooldown for this rule, or `None` when a forward is allowed.
    pub fn time_until_allowed(&self, now: Instant) -> Option<Duration> {
        let last = (*self.last_forward.lock().expect("last-forward lock poisoned"))?;
        let elapsed = now.duration_since(last);
        if elapsed < FORWARD_COOLDOWN {
            Some(FORWARD_COOLDOWN - elapsed)
        } else {
            None
        }
    }

    /// Record a successful forward at `now`.
    pub fn mark_forwarded(&self, now: Instant) {
        *self.last_forward.lock().expect("last-forward lock poisoned") = Some(now);
    }
}

/// An immutable view of the enabled rule set, shared by reference counting.
pub struct IndexSnapshot {
    entries: Vec<Arc<IndexEntry>>,
}

impl IndexSnapshot {
    /// A snapshot with no rules, used before the first reload.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Compile the given rules into a fresh snapshot.
    ///
    /// Rules whose pattern fails to compile are skipped with a warning; they
    /// stay in the durable store and are retried on the next reload. Returns
    /// the snapshot and the number of rules skipped.
    pub fn build(rules: Vec<ForwardRule>) -> (Self, usize) {
        let mut entries = Vec::with_capacity(rules.len());
        let mut skipped = 0;
        for rule in rules {
            match Regex::new(&rule.match_pattern) {
                Ok(pattern) => entries.push(Arc::new(IndexEntry::new(rule, pattern))),
                Err(e) => {
                    warn!(rule_id = rule.id, error = %e, "failed to compile rule pattern, skipping");
                    skipped += 1;
                }
            }
        }
        (Self { entries }, skipped)
    }

    /// Number of active rules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rules listening on the given source channel.
    pub fn for_channel(&self, channel_id: i64) -> impl Iterator<Item = &Arc<IndexEntry>> {
        self.entries
            .iter()
            .filter(move |e| e.rule.source_channel_id == channel_id)
    }

    /// Look up an entry by rule id.
    pub fn find(&self, rule_id: i64) -> Option<&Arc<IndexEntry>> {
        self.entries.iter().find(|e| e.rule.id == rule_id)
    }
}

/// The engine-owned rule index: many readers, one writer (reload).
pub struct RuleIndex {
    snapshot: RwLock<Arc<IndexSnapshot>>,
}

impl RuleIndex {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(IndexSnapshot::empty())),
        }
    }

    /// Atomically replace the active snapshot. Per-rule last-forward
    /// timestamps reset with it.
    pub fn install(&self, snapshot: IndexSnapshot) {
        *self.snapshot.write().expect("rule index lock poisoned") = Arc::new(snapshot);
    }

    /// The current snapshot. Callers iterate it without holding any lock.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&self.snapshot.read().expect("rule index lock poisoned"))
    }

    /// Record a successful forward for `rule_id` in the current snapshot.
    pub fn mark_forwarded(&self, rule_id: i64) {
        if let Some(entry) = self.snapshot().find(rule_id) {
            entry.mark_forwarded(Instant::now());
        }
    }

    /// Remaining cooldown for `rule_id`, or `None` when a forward is allowed
    /// (including when the rule is no longer in the active set).
    pub fn time_until_allowed(&self, rule_id: i64) -> Option<Duration> {
        self.snapshot()
            .find(rule_id)
            .and_then(|entry| entry.time_until_allowed(Instant::now()))
    }
}

impl Default for RuleIndex {
    fn default() -> Self {
        Self::new()
    }
}

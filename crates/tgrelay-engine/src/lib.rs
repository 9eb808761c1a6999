// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The tgrelay forwarding engine.
//!
//! Bridges the upstream client's update stream with the outbound forward
//! API: incoming channel messages are matched against the active rule set,
//! deduplicated against the durable forward log, rate-limited to one forward
//! per rule per minute, and relayed by background workers. Newly activated
//! rules get a bounded historical backfill through the same worker path.
//!
//! Module map:
//! - [`index`]: read-optimized snapshot of enabled rules with compiled
//!   patterns and per-rule rate-limit clocks
//! - [`dispatch`]: consumes update envelopes and fans matches out to workers
//! - [`worker`]: executes a single outbound forward and records it
//! - [`backfill`]: bounded, paced sweep of recent history on rule activation
//! - [`lifecycle`]: cancellation signal and the outbound-client slot

pub mod backfill;
pub mod dispatch;
pub mod index;
pub mod lifecycle;
pub mod worker;

use std::sync::Arc;

use tgrelay_storage::{Database, queries};
use tokio_util::sync::CancellationToken;
use tracing::info;

use tgrelay_core::RelayError;

pub use index::{FORWARD_COOLDOWN, IndexSnapshot, RuleIndex};
pub use lifecycle::{Lifecycle, install_signal_handler};

/// The forwarding engine. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    db: Database,
    index: RuleIndex,
    lifecycle: Lifecycle,
}

impl Engine {
    /// Create an engine over the given database, tied to the given
    /// cancellation token (usually the process signal handler's).
    ///
    /// The rule index starts empty; call [`Engine::reload_rules`] to load the
    /// active set. The outbound client is wired later through
    /// [`Engine::lifecycle`].
    pub fn new(db: Database, cancel: CancellationToken) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                db,
                index: RuleIndex::new(),
                lifecycle: Lifecycle::new(cancel),
            }),
        }
    }

    /// Load all enabled rules from the store, compile their patterns, and
    /// atomically swap in the new index. Rules with uncompilable patterns
    /// are skipped (and retried on the next reload); per-rule rate-limit
    /// clocks reset.
    ///
    /// Returns the number of rules in the new active set.
    pub async fn reload_rules(&self) -> Result<usize, RelayError> {
        let rules = queries::rules::list_enabled(&self.inner.db).await?;
        let (snapshot, skipped) = IndexSnapshot::build(rules);
        let count = snapshot.len();
        self.inner.index.install(snapshot);
        info!(count, skipped, "forwarding rules loaded");
        Ok(count)
    }

    /// The engine's rule index.
    pub fn index(&self) -> &RuleIndex {
        &self.inner.index
    }

    /// The engine's lifecycle controller.
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.inner.lifecycle
    }

    /// The database the engine reads rules from and writes forward logs to.
    pub fn database(&self) -> &Database {
        &self.inner.db
    }
}

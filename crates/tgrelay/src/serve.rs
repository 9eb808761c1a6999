// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tgrelay serve` command implementation.
//!
//! Wires the pieces together: validated config, SQLite storage with
//! migrations, the forwarding engine, the JSON-RPC admin API, and a
//! signal-driven graceful shutdown. A failure to open the database, migrate,
//! or bind the HTTP port aborts startup with an error (non-zero exit);
//! a signal-triggered shutdown returns cleanly.

use std::sync::Arc;

use tracing::{error, info, warn};

use tgrelay_config::{RelayConfig, validate_config};
use tgrelay_core::RelayError;
use tgrelay_engine::{Engine, install_signal_handler};
use tgrelay_rpc::admin_handler;
use tgrelay_storage::Database;

/// Run the forwarder daemon until a shutdown signal arrives.
pub async fn run_serve(config: RelayConfig) -> Result<(), RelayError> {
    if let Err(errors) = validate_config(&config) {
        return Err(RelayError::Config(errors.join("; ")));
    }

    info!("starting tgrelay serve");

    let db =
        Database::open_with_wal(&config.storage.database_path, config.storage.wal_mode).await?;
    info!(path = %config.storage.database_path, "storage initialized");

    let cancel = install_signal_handler();
    let engine = Engine::new(db.clone(), cancel.clone());

    // A failed initial load is not fatal: the store may be empty or a rule
    // row unreadable, and every admin mutation reloads again.
    if let Err(e) = engine.reload_rules().await {
        error!(error = %e, "failed to load forwarding rules");
    }

    if config.telegram.app_id == 0 {
        warn!(
            "telegram credentials not configured; realtime forwarding stays idle until a client is wired"
        );
    } else {
        info!(
            app_id = config.telegram.app_id,
            session_path = %config.telegram.session_path,
            "telegram client configured; engine waits for it to be wired"
        );
    }

    let handler = Arc::new(admin_handler(db, engine));
    tgrelay_rpc::server::serve(&config.service, handler, cancel).await?;

    info!("tgrelay serve shutdown complete");
    Ok(())
}

// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the tgrelay forwarder.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed query modules for
//! forwarding rules, the forward-log dedup ledger, and opaque client
//! session blobs.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::{LogInsert, NewForwardLog, NewForwardRule, RuleChanges};
pub use queries::sessions::SessionStore;

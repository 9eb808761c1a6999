// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Query modules accept `&Database` and go through `connection()`;
//! do not create additional connections for writes.

use tgrelay_core::RelayError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Handle to the forwarder's SQLite database.
///
/// Cloning is cheap and every clone shares the same background connection
/// thread, which is what serializes concurrent writers.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` with WAL mode on,
    /// apply PRAGMAs, and run pending migrations.
    pub async fn open(path: &str) -> Result<Self, RelayError> {
        Self::open_with_wal(path, true).await
    }

    /// Open the database with explicit control over WAL mode.
    pub async fn open_with_wal(path: &str, wal_mode: bool) -> Result<Self, RelayError> {
        let conn = Connection::open(path.to_owned()).await.map_err(map_tr_err)?;

        conn.call(move |conn| {
            if wal_mode {
                // journal_mode reports the resulting mode as a row.
                let _mode: String =
                    conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.busy_timeout(std::time::Duration::from_millis(5000))?;
            migrations::run_migrations(conn)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), RelayError> {
        self.conn
            .call(|conn| {
                // wal_checkpoint reports its result as a row.
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_row| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(map_tr_err)?;
        debug!("database closed");
        Ok(())
    }
}

/// Convert a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> RelayError {
    RelayError::Storage { source: Box::new(e) }
}

// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Opaque session-blob persistence for the external Telegram client.
//!
//! The client owns the format; the store only keeps the bytes. A single row
//! holds the current session.

use rusqlite::params;
use tgrelay_core::RelayError;

use crate::database::Database;

const SESSION_ROW_ID: i64 = 1;

/// Load the stored session blob, if any.
pub async fn load(db: &Database) -> Result<Option<Vec<u8>>, RelayError> {
    db.connection()
        .call(|conn| {
            let result = conn.query_row(
                "SELECT data FROM telegram_sessions WHERE id = ?1",
                params![SESSION_ROW_ID],
                |row| row.get::<_, Vec<u8>>(0),
            );
            match result {
                Ok(data) => Ok(Some(data)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Store (or replace) the session blob.
pub async fn store(db: &Database, data: Vec<u8>) -> Result<(), RelayError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO telegram_sessions (id, data) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET data = excluded.data",
                params![SESSION_ROW_ID, data],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Handle an external MTProto client can use as its session storage.
///
/// Wraps the forwarder's database so the client session survives restarts
/// alongside the rules it serves.
#[derive(Clone)]
pub struct SessionStore {
    db: Database,
}

impl SessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Load the stored session blob, if any.
    pub async fn load(&self) -> Result<Option<Vec<u8>>, RelayError> {
        load(&self.db).await
    }

    /// Store (or replace) the session blob.
    pub async fn store(&self, data: Vec<u8>) -> Result<(), RelayError> {
        store(&self.db, data).await
    }
}

// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Forward-log operations: the durable dedup ledger.

use rusqlite::params;
use tgrelay_core::{ForwardLog, RelayError};

use crate::database::Database;
use crate::models::{LogInsert, NewForwardLog};

/// Whether a `(rule_id, message_id)` pair has already been forwarded.
pub async fn exists(db: &Database, rule_id: i64, message_id: i32) -> Result<bool, RelayError> {
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM forward_logs WHERE rule_id = ?1 AND message_id = ?2",
                params![rule_id, message_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a forward. Returns [`LogInsert::Duplicate`] when the UNIQUE
/// `(rule_id, message_id)` index rejects the row; every other failure is an
/// error.
pub async fn insert(db: &Database, log: NewForwardLog) -> Result<LogInsert, RelayError> {
    db.connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO forward_logs
                     (rule_id, message_id, source_channel_id, target_channel_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    log.rule_id,
                    log.message_id,
                    log.source_channel_id,
                    log.target_channel_id,
                ],
            );
            match result {
                Ok(_) => Ok(LogInsert::Inserted),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(LogInsert::Duplicate)
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a log entry by its dedup key. Mostly useful for inspection and tests.
pub async fn get(
    db: &Database,
    rule_id: i64,
    message_id: i32,
) -> Result<Option<ForwardLog>, RelayError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, rule_id, message_id, source_channel_id, target_channel_id, created_at
                 FROM forward_logs WHERE rule_id = ?1 AND message_id = ?2",
                params![rule_id, message_id],
                |row| {
                    Ok(ForwardLog {
                        id: row.get(0)?,
                        rule_id: row.get(1)?,
                        message_id: row.get(2)?,
                        source_channel_id: row.get(3)?,
                        target_channel_id: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            );
            match result {
                Ok(log) => Ok(Some(log)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count log rows for one rule.
pub async fn count_for_rule(db: &Database, rule_id: i64) -> Result<i64, RelayError> {
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM forward_logs WHERE rule_id = ?1",
                params![rule_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Forward-rule CRUD operations.

use rusqlite::{Row, params};
use tgrelay_core::{ForwardRule, RelayError};

use crate::database::Database;
use crate::models::{NewForwardRule, RuleChanges};

const RULE_COLUMNS: &str = "id, source_channel_id, source_name, source_hash, \
     target_channel_id, target_name, target_hash, match_pattern, enabled, \
     created_at, updated_at";

fn rule_from_row(row: &Row<'_>) -> rusqlite::Result<ForwardRule> {
    Ok(ForwardRule {
        id: row.get(0)?,
        source_channel_id: row.get(1)?,
        source_name: row.get(2)?,
        source_hash: row.get(3)?,
        target_channel_id: row.get(4)?,
        target_name: row.get(5)?,
        target_hash: row.get(6)?,
        match_pattern: row.get(7)?,
        enabled: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Insert a new rule and return the stored row.
pub async fn create(db: &Database, rule: NewForwardRule) -> Result<ForwardRule, RelayError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO forward_rules
                     (source_channel_id, source_name, source_hash,
                      target_channel_id, target_name, target_hash,
                      match_pattern, enabled)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    rule.source_channel_id,
                    rule.source_name,
                    rule.source_hash,
                    rule.target_channel_id,
                    rule.target_name,
                    rule.target_hash,
                    rule.match_pattern,
                    rule.enabled,
                ],
            )?;
            let id = conn.last_insert_rowid();
            let stored = conn.query_row(
                &format!("SELECT {RULE_COLUMNS} FROM forward_rules WHERE id = ?1"),
                params![id],
                rule_from_row,
            )?;
            Ok(stored)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a rule by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<ForwardRule>, RelayError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {RULE_COLUMNS} FROM forward_rules WHERE id = ?1"),
                params![id],
                rule_from_row,
            );
            match result {
                Ok(rule) => Ok(Some(rule)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all rules, newest first.
pub async fn list_all(db: &Database) -> Result<Vec<ForwardRule>, RelayError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RULE_COLUMNS} FROM forward_rules ORDER BY id DESC"
            ))?;
            let rows = stmt.query_map([], rule_from_row)?;
            let mut rules = Vec::new();
            for row in rows {
                rules.push(row?);
            }
            Ok(rules)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List enabled rules in insertion order. This is the active set the engine
/// loads on reload.
pub async fn list_enabled(db: &Database) -> Result<Vec<ForwardRule>, RelayError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RULE_COLUMNS} FROM forward_rules WHERE enabled = 1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map([], rule_from_row)?;
            let mut rules = Vec::new();
            for row in rows {
                rules.push(row?);
            }
            Ok(rules)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Apply a partial update and return the updated row, or `None` when the
/// rule does not exist. `updated_at` is bumped even for empty change sets.
pub async fn update(
    db: &Database,
    id: i64,
    changes: RuleChanges,
) -> Result<Option<ForwardRule>, RelayError> {
    db.connection()
        .call(move |conn| {
            let mut sets: Vec<&str> = Vec::new();
            let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(v) = changes.source_channel_id {
                sets.push("source_channel_id = ?");
                values.push(Box::new(v));
            }
            if let Some(v) = changes.source_name {
                sets.push("source_name = ?");
                values.push(Box::new(v));
            }
            if let Some(v) = changes.source_hash {
                sets.push("source_hash = ?");
                values.push(Box::new(v));
            }
            if let Some(v) = changes.target_channel_id {
                sets.push("target_channel_id = ?");
                values.push(Box::new(v));
            }
            if let Some(v) = changes.target_name {
                sets.push("target_name = ?");
                values.push(Box::new(v));
            }
            if let Some(v) = changes.target_hash {
                sets.push("target_hash = ?");
                values.push(Box::new(v));
            }
            if let Some(v) = changes.match_pattern {
                sets.push("match_pattern = ?");
                values.push(Box::new(v));
            }
            if let Some(v) = changes.enabled {
                sets.push("enabled = ?");
                values.push(Box::new(v));
            }
            sets.push("updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')");

            let sql = format!(
                "UPDATE forward_rules SET {} WHERE id = ?",
                sets.join(", ")
            );
            values.push(Box::new(id));

            let affected = conn.execute(
                &sql,
                rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())),
            )?;
            if affected == 0 {
                return Ok(None);
            }

            let stored = conn.query_row(
                &format!("SELECT {RULE_COLUMNS} FROM forward_rules WHERE id = ?1"),
                params![id],
                rule_from_row,
            )?;
            Ok(Some(stored))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a rule. Returns `true` when a row was removed. Forward logs are
/// kept so dedup holds even if an id were ever reused.
pub async fn delete(db: &Database, id: i64) -> Result<bool, RelayError> {
    db.connection()
        .call(move |conn| {
            let affected = conn.execute("DELETE FROM forward_rules WHERE id = ?1", params![id])?;
            Ok(affected > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flip the enabled flag and return the updated row.
pub async fn set_enabled(
    db: &Database,
    id: i64,
    enabled: bool,
) -> Result<Option<ForwardRule>, RelayError> {
    update(
        db,
        id,
        RuleChanges {
            enabled: Some(enabled),
            ..RuleChanges::default()
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_rule(source: i64, target: i64, pattern: &str) -> NewForwardRule {
        NewForwardRule {
            source_channel_id: source,
            source_name: "src".to_string(),
            source_hash: 11,
            target_channel_id: target,
            target_name: "dst".to_string(),
            target_hash: 22,
            match_pattern: pattern.to_string(),
            enabled: true,
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() {
        let (db, _dir) = setup_db().await;

        let rule = create(&db, make_rule(100, 200, "ALERT:.*")).await.unwrap();
        assert!(rule.id > 0);
        assert_eq!(rule.source_channel_id, 100);
        assert_eq!(rule.target_channel_id, 200);
        assert_eq!(rule.match_pattern, "ALERT:.*");
        assert!(rule.enabled);
        assert!(!rule.created_at.is_empty());
        assert_eq!(rule.created_at, rule.updated_at);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_roundtrips_and_misses_return_none() {
        let (db, _dir) = setup_db().await;

        let created = create(&db, make_rule(1, 2, ".*")).await.unwrap();
        let fetched = get(&db, created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        assert!(get(&db, 9999).await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_all_returns_newest_first() {
        let (db, _dir) = setup_db().await;

        let first = create(&db, make_rule(1, 2, "a")).await.unwrap();
        let second = create(&db, make_rule(3, 4, "b")).await.unwrap();

        let all = list_all(&db).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_enabled_excludes_disabled_rules() {
        let (db, _dir) = setup_db().await;

        let keep = create(&db, make_rule(1, 2, "a")).await.unwrap();
        let off = create(&db, make_rule(3, 4, "b")).await.unwrap();
        set_enabled(&db, off.id, false).await.unwrap();

        let enabled = list_enabled(&db).await.unwrap();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].id, keep.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_changes_only_requested_fields() {
        let (db, _dir) = setup_db().await;

        let rule = create(&db, make_rule(1, 2, "old")).await.unwrap();
        let updated = update(
            &db,
            rule.id,
            RuleChanges {
                match_pattern: Some("new".to_string()),
                target_name: Some("renamed".to_string()),
                ..RuleChanges::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.match_pattern, "new");
        assert_eq!(updated.target_name, "renamed");
        assert_eq!(updated.source_channel_id, 1);
        assert_eq!(updated.source_name, "src");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_missing_rule_returns_none() {
        let (db, _dir) = setup_db().await;
        let result = update(
            &db,
            42,
            RuleChanges {
                match_pattern: Some("x".to_string()),
                ..RuleChanges::default()
            },
        )
        .await
        .unwrap();
        assert!(result.is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let (db, _dir) = setup_db().await;

        let rule = create(&db, make_rule(1, 2, "x")).await.unwrap();
        assert!(delete(&db, rule.id).await.unwrap());
        assert!(get(&db, rule.id).await.unwrap().is_none());
        assert!(!delete(&db, rule.id).await.unwrap());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let (db, _dir) = setup_db().await;

        let first = create(&db, make_rule(1, 2, "x")).await.unwrap();
        delete(&db, first.id).await.unwrap();
        let second = create(&db, make_rule(3, 4, "y")).await.unwrap();

        assert!(second.id > first.id);

        db.close().await.unwrap();
    }
}

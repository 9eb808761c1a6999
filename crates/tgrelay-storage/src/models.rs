// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Insert/update shapes for storage operations.
//!
//! The canonical row types (`ForwardRule`, `ForwardLog`) live in
//! `tgrelay_core::types`; this module holds the write-side companions the
//! query modules accept.

/// Fields of a rule to be inserted. The store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewForwardRule {
    pub source_channel_id: i64,
    pub source_name: String,
    pub source_hash: i64,
    pub target_channel_id: i64,
    pub target_name: String,
    pub target_hash: i64,
    pub match_pattern: String,
    pub enabled: bool,
}

/// Partial update of a rule. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct RuleChanges {
    pub source_channel_id: Option<i64>,
    pub source_name: Option<String>,
    pub source_hash: Option<i64>,
    pub target_channel_id: Option<i64>,
    pub target_name: Option<String>,
    pub target_hash: Option<i64>,
    pub match_pattern: Option<String>,
    pub enabled: Option<bool>,
}

impl RuleChanges {
    /// Whether the update touches any column.
    pub fn is_empty(&self) -> bool {
        self.source_channel_id.is_none()
            && self.source_name.is_none()
            && self.source_hash.is_none()
            && self.target_channel_id.is_none()
            && self.target_name.is_none()
            && self.target_hash.is_none()
            && self.match_pattern.is_none()
            && self.enabled.is_none()
    }
}

/// Fields of a forward log entry to be inserted.
#[derive(Debug, Clone)]
pub struct NewForwardLog {
    pub rule_id: i64,
    pub message_id: i32,
    pub source_channel_id: i64,
    pub target_channel_id: i64,
}

/// Outcome of a forward-log insert.
///
/// `Duplicate` means the UNIQUE `(rule_id, message_id)` index rejected the
/// row: the message was already forwarded by this rule, typically by a
/// concurrent path. Callers treat it as benign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogInsert {
    Inserted,
    Duplicate,
}

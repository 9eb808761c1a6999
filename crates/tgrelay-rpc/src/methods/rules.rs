// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule administration methods: create, list, update, delete, enable.
//!
//! Every mutation reloads the engine's rule index synchronously before
//! returning. Backfills run asynchronously whenever a rule transitions into
//! the enabled state (creation counts as such a transition).

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use tgrelay_core::RelayError;
use tgrelay_engine::Engine;
use tgrelay_storage::{Database, NewForwardRule, RuleChanges, queries};

use crate::RpcMethod;
use crate::methods::{decode_params, to_result};

/// Reject patterns that cannot compile before they reach the store.
fn validate_pattern(pattern: &str) -> Result<(), RelayError> {
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| RelayError::InvalidRule(format!("invalid regex pattern: {e}")))
}

/// Reload the engine after a rule mutation. A reload failure leaves the
/// previous index in place, so the admin call still succeeds.
async fn reload_engine(engine: &Engine) {
    if let Err(e) = engine.reload_rules().await {
        warn!(error = %e, "rule reload failed after admin change");
    }
}

// --- rules.create ---

pub struct RulesCreate {
    db: Database,
    engine: Engine,
}

impl RulesCreate {
    pub fn new(db: Database, engine: Engine) -> Self {
        Self { db, engine }
    }
}

#[derive(Debug, Deserialize)]
struct CreateRuleParams {
    #[serde(default)]
    source_channel_id: i64,
    #[serde(default)]
    source_name: String,
    #[serde(default)]
    source_hash: i64,
    #[serde(default)]
    target_channel_id: i64,
    #[serde(default)]
    target_name: String,
    #[serde(default)]
    target_hash: i64,
    #[serde(default)]
    match_pattern: String,
}

#[async_trait]
impl RpcMethod for RulesCreate {
    fn name(&self) -> &'static str {
        "rules.create"
    }

    async fn execute(&self, params: Value) -> Result<Value, RelayError> {
        let p: CreateRuleParams = decode_params(params)?;
        if p.source_channel_id == 0 || p.target_channel_id == 0 || p.match_pattern.is_empty() {
            return Err(RelayError::InvalidRule(
                "source_channel_id, target_channel_id, and match_pattern are required".into(),
            ));
        }
        validate_pattern(&p.match_pattern)?;

        let rule = queries::rules::create(
            &self.db,
            NewForwardRule {
                source_channel_id: p.source_channel_id,
                source_name: p.source_name,
                source_hash: p.source_hash,
                target_channel_id: p.target_channel_id,
                target_name: p.target_name,
                target_hash: p.target_hash,
                match_pattern: p.match_pattern,
                enabled: true,
            },
        )
        .await?;

        reload_engine(&self.engine).await;
        self.engine.spawn_backfill(rule.clone());

        to_result(rule)
    }
}

// --- rules.list ---

pub struct RulesList {
    db: Database,
}

impl RulesList {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RpcMethod for RulesList {
    fn name(&self) -> &'static str {
        "rules.list"
    }

    async fn execute(&self, _params: Value) -> Result<Value, RelayError> {
        let rules = queries::rules::list_all(&self.db).await?;
        to_result(rules)
    }
}

// --- rules.update ---

pub struct RulesUpdate {
    db: Database,
    engine: Engine,
}

impl RulesUpdate {
    pub fn new(db: Database, engine: Engine) -> Self {
        Self { db, engine }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateRuleParams {
    #[serde(default)]
    id: i64,
    source_channel_id: Option<i64>,
    source_name: Option<String>,
    source_hash: Option<i64>,
    target_channel_id: Option<i64>,
    target_name: Option<String>,
    target_hash: Option<i64>,
    match_pattern: Option<String>,
    enabled: Option<bool>,
}

#[async_trait]
impl RpcMethod for RulesUpdate {
    fn name(&self) -> &'static str {
        "rules.update"
    }

    async fn execute(&self, params: Value) -> Result<Value, RelayError> {
        let p: UpdateRuleParams = decode_params(params)?;
        if p.id == 0 {
            return Err(RelayError::InvalidParams("id is required".into()));
        }
        if let Some(ref pattern) = p.match_pattern {
            validate_pattern(pattern)?;
        }

        let existing = queries::rules::get(&self.db, p.id)
            .await?
            .ok_or_else(|| RelayError::NotFound(format!("rule {}", p.id)))?;

        let updated = queries::rules::update(
            &self.db,
            p.id,
            RuleChanges {
                source_channel_id: p.source_channel_id,
                source_name: p.source_name,
                source_hash: p.source_hash,
                target_channel_id: p.target_channel_id,
                target_name: p.target_name,
                target_hash: p.target_hash,
                match_pattern: p.match_pattern,
                enabled: p.enabled,
            },
        )
        .await?
        .ok_or_else(|| RelayError::NotFound(format!("rule {}", p.id)))?;

        reload_engine(&self.engine).await;
        if !existing.enabled && updated.enabled {
            self.engine.spawn_backfill(updated.clone());
        }

        to_result(updated)
    }
}

// --- rules.delete ---

pub struct RulesDelete {
    db: Database,
    engine: Engine,
}

impl RulesDelete {
    pub fn new(db: Database, engine: Engine) -> Self {
        Self { db, engine }
    }
}

#[derive(Debug, Deserialize)]
struct DeleteRuleParams {
    #[serde(default)]
    id: i64,
}

#[async_trait]
impl RpcMethod for RulesDelete {
    fn name(&self) -> &'static str {
        "rules.delete"
    }

    async fn execute(&self, params: Value) -> Result<Value, RelayError> {
        let p: DeleteRuleParams = decode_params(params)?;
        if p.id == 0 {
            return Err(RelayError::InvalidParams("id is required".into()));
        }

        let deleted = queries::rules::delete(&self.db, p.id).await?;
        if !deleted {
            return Err(RelayError::NotFound(format!("rule {}", p.id)));
        }

        reload_engine(&self.engine).await;
        Ok(json!({ "deleted": true }))
    }
}

// --- rules.enable ---

pub struct RulesEnable {
    db: Database,
    engine: Engine,
}

impl RulesEnable {
    pub fn new(db: Database, engine: Engine) -> Self {
        Self { db, engine }
    }
}

#[derive(Debug, Deserialize)]
struct EnableRuleParams {
    #[serde(default)]
    id: i64,
    enabled: bool,
}

#[async_trait]
impl RpcMethod for RulesEnable {
    fn name(&self) -> &'static str {
        "rules.enable"
    }

    async fn execute(&self, params: Value) -> Result<Value, RelayError> {
        let p: EnableRuleParams = decode_params(params)?;
        if p.id == 0 {
            return Err(RelayError::InvalidParams("id is required".into()));
        }

        let existing = queries::rules::get(&self.db, p.id)
            .await?
            .ok_or_else(|| RelayError::NotFound(format!("rule {}", p.id)))?;

        let updated = queries::rules::set_enabled(&self.db, p.id, p.enabled)
            .await?
            .ok_or_else(|| RelayError::NotFound(format!("rule {}", p.id)))?;

        reload_engine(&self.engine).await;
        if !existing.enabled && updated.enabled {
            self.engine.spawn_backfill(updated.clone());
        }

        to_result(updated)
    }
}

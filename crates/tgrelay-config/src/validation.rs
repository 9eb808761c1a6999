// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-zero ports and credential pairing.

use crate::model::RelayConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<String>)` with all
/// collected validation errors (does not fail fast).
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.service.host.trim().is_empty() {
        errors.push("service.host must not be empty".to_string());
    }

    if config.service.port == 0 {
        errors.push("service.port must be non-zero".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push("storage.database_path must not be empty".to_string());
    }

    // Credentials come in pairs: a set app_id without an app_hash (or the
    // reverse) cannot connect a client.
    if config.telegram.app_id != 0 && config.telegram.app_hash.trim().is_empty() {
        errors.push("telegram.app_hash is required when telegram.app_id is set".to_string());
    }
    if config.telegram.app_id == 0 && !config.telegram.app_hash.trim().is_empty() {
        errors.push("telegram.app_id is required when telegram.app_hash is set".to_string());
    }
    if config.telegram.app_id != 0 && config.telegram.session_path.trim().is_empty() {
        errors.push("telegram.session_path must not be empty when a client is configured".to_string());
    }

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        errors.push(format!(
            "log.level must be one of {LOG_LEVELS:?}, got `{}`",
            config.log.level
        ));
    }

    if config.log.max_size_mb == 0 {
        errors.push("log.max_size_mb must be at least 1".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the tgrelay forwarder.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so typos in config keys
//! fail loudly at startup instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level tgrelay configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// HTTP admin API settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Telegram client credentials.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log output settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// HTTP admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Address to bind the admin API to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the admin API to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enables per-request HTTP logging.
    #[serde(default)]
    pub debug: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Telegram client credentials.
///
/// `app_id == 0` means no client is configured; the forwarder still serves
/// the admin API but realtime forwarding stays idle until a client is wired.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Application id issued by my.telegram.org.
    #[serde(default)]
    pub app_id: i32,

    /// Application hash issued by my.telegram.org.
    #[serde(default)]
    pub app_hash: String,

    /// Session path, interpreted by the client's session adapter.
    #[serde(default = "default_session_path")]
    pub session_path: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            app_id: 0,
            app_hash: String::new(),
            session_path: default_session_path(),
        }
    }
}

fn default_session_path() -> String {
    "tgrelay.session".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "tgrelay.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Log file path. Empty means stderr only.
    #[serde(default)]
    pub filename: String,

    /// Maximum log file size in megabytes before the file is rotated aside
    /// at startup.
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filename: String::new(),
            max_size_mb: default_max_size_mb(),
            level: default_log_level(),
        }
    }
}

fn default_max_size_mb() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the tgrelay forwarder.

use thiserror::Error;

/// The primary error type used across all tgrelay crates.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Telegram client errors (outbound call failure, history fetch failure).
    #[error("telegram error: {message}")]
    Telegram {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The outbound client has not been wired into the engine yet.
    ///
    /// Recoverable: callers retry after the client finishes connecting.
    #[error("telegram client not ready")]
    ClientNotReady,

    /// A rule failed validation (empty channel ids, malformed pattern).
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// A request carried malformed or missing parameters.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// A requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// HTTP server errors (bind failure, serve failure).
    #[error("http server error: {0}")]
    Http(String),

    /// The operation was interrupted by engine shutdown.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Wrap an arbitrary error as a storage error.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RelayError::Storage {
            source: Box::new(source),
        }
    }

    /// Build a telegram error from a message, without a source.
    pub fn telegram(message: impl Into<String>) -> Self {
        RelayError::Telegram {
            message: message.into(),
            source: None,
        }
    }
}

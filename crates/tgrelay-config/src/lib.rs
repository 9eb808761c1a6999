// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the tgrelay forwarder.
//!
//! Layered TOML loading via Figment (system, XDG user, local directory)
//! with `TGRELAY_`-prefixed environment overrides, plus post-load semantic
//! validation.

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{LogConfig, RelayConfig, ServiceConfig, StorageConfig, TelegramConfig};
pub use validation::validate_config;

// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing initialization: stderr output, plus an optional non-blocking log
//! file.
//!
//! The file is rotated aside (renamed to `<name>.1`) at startup when it has
//! grown past `log.max_size_mb`.

use std::ffi::OsString;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tgrelay_config::LogConfig;

const WORKSPACE_TARGETS: &[&str] = &[
    "tgrelay",
    "tgrelay_config",
    "tgrelay_core",
    "tgrelay_engine",
    "tgrelay_rpc",
    "tgrelay_storage",
];

/// Initialize the global tracing subscriber.
///
/// Returns the file writer's guard when a log file is configured; the caller
/// holds it for the process lifetime so buffered lines flush on exit.
pub fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    if config.filename.is_empty() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
        return None;
    }

    let path = Path::new(&config.filename);
    rotate_if_oversized(path, config.max_size_mb.saturating_mul(1024 * 1024));

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("tgrelay.log"));

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        dir, file_name,
    ));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();

    Some(guard)
}

/// Workspace crates at the configured level, everything else at warn.
fn default_directives(level: &str) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        WORKSPACE_TARGETS
            .iter()
            .map(|target| format!("{target}={level}")),
    );
    directives.join(",")
}

/// Move an oversized log file aside so the appender starts fresh.
fn rotate_if_oversized(path: &Path, max_bytes: u64) {
    let Ok(metadata) = std::fs::metadata(path) else {
        return;
    };
    if metadata.len() <= max_bytes {
        return;
    }

    let mut rotated = path.as_os_str().to_os_string();
    rotated.push(".1");
    if let Err(e) = std::fs::rename(path, &rotated) {
        eprintln!("warning: failed to rotate oversized log file {path:?}: {e}");
    }
}

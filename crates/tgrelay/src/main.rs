// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! tgrelay - a rule-based Telegram message forwarder.
//!
//! This is the binary entry point for the forwarder daemon.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod logging;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;

use tgrelay_config::RelayConfig;

/// tgrelay - a rule-based Telegram message forwarder.
#[derive(Parser, Debug)]
#[command(name = "tgrelay", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the forwarder daemon.
    Serve {
        /// Load this config file instead of the XDG hierarchy.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            let config = match load(config) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("error: failed to load configuration: {e}");
                    std::process::exit(1);
                }
            };

            // The guard keeps the non-blocking file writer alive until exit.
            let _guard = logging::init_logging(&config.log);

            if let Err(e) = serve::run_serve(config).await {
                error!(error = %e, "tgrelay serve failed");
                std::process::exit(1);
            }
        }
    }
}

#[allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper
fn load(path: Option<PathBuf>) -> Result<RelayConfig, figment::Error> {
    match path {
        Some(path) => tgrelay_config::load_config_from_path(&path),
        None => tgrelay_config::load_config(),
    }
}

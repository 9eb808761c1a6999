// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine lifecycle: cancellation signal and the outbound-client slot.
//!
//! The engine is constructed before the upstream Telegram client finishes
//! connecting, so the outbound API handle arrives later through [`Lifecycle::wire`].
//! Until then every data-path access fails with the recoverable
//! [`RelayError::ClientNotReady`] instead of dereferencing an absent handle.

use std::sync::Arc;

use tgrelay_core::{RelayError, TelegramApi};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

type ApiSlot = Option<Arc<dyn TelegramApi>>;

/// Owns the engine-scoped cancellation token and the outbound client.
pub struct Lifecycle {
    cancel: CancellationToken,
    api_tx: watch::Sender<ApiSlot>,
}

impl Lifecycle {
    /// Create a lifecycle driven by the given cancellation token, typically
    /// the one returned by [`install_signal_handler`].
    pub fn new(cancel: CancellationToken) -> Self {
        let (api_tx, _) = watch::channel(None);
        Self { cancel, api_tx }
    }

    /// Install the outbound client. Unblocks every [`Lifecycle::api_ready`] waiter.
    pub fn wire(&self, api: Arc<dyn TelegramApi>) {
        self.api_tx.send_replace(Some(api));
        info!("telegram client wired into engine");
    }

    /// The outbound client, or `ClientNotReady` before wiring.
    pub fn try_api(&self) -> Result<Arc<dyn TelegramApi>, RelayError> {
        self.api_tx
            .borrow()
            .clone()
            .ok_or(RelayError::ClientNotReady)
    }

    /// Wait until the outbound client is wired, or shutdown fires.
    pub async fn api_ready(&self) -> Result<Arc<dyn TelegramApi>, RelayError> {
        let mut rx = self.api_tx.subscribe();
        tokio::select! {
            changed = rx.wait_for(|slot| slot.is_some()) => {
                let slot = changed.map_err(|_| RelayError::ClientNotReady)?;
                slot.clone().ok_or(RelayError::ClientNotReady)
            }
            _ = self.cancel.cancelled() => Err(RelayError::Cancelled),
        }
    }

    /// A clone of the engine-scoped cancellation token.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether engine shutdown has fired.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fire the engine's cancellation signal.
    pub fn shutdown(&self) {
        debug!("engine lifecycle shutdown requested");
        self.cancel.cancel();
    }
}

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is
/// received. The handler task runs in the background until then.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the tgrelay message forwarder.
//!
//! This crate provides the shared error type, the canonical domain types
//! (forwarding rules and forward logs), and the trait contracts the engine
//! shares with the external Telegram client. Every other crate in the
//! workspace builds on these definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RelayError;
pub use traits::{TelegramApi, UpdateHandler};
pub use types::{
    ChannelMessage, DialogInfo, DialogKind, ForwardLog, ForwardRequest, ForwardRule,
    InputChannelPeer, Peer, TelegramUpdate, UpdatesEnvelope,
};

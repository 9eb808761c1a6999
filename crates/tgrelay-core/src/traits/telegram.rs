// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contract between the forwarding engine and the external MTProto client.
//!
//! The client itself lives outside this workspace. It delivers updates into
//! the engine through [`UpdateHandler`] and exposes the outbound operations
//! the engine needs through [`TelegramApi`]. A mock implementation for tests
//! lives in `tgrelay-test-utils`.

use async_trait::async_trait;

use crate::error::RelayError;
use crate::types::{
    ChannelMessage, DialogInfo, ForwardRequest, InputChannelPeer, UpdatesEnvelope,
};

/// Outbound operations the engine invokes on the Telegram client.
#[async_trait]
pub trait TelegramApi: Send + Sync {
    /// Fetch the most recent messages of a channel, newest first.
    async fn get_history(
        &self,
        peer: InputChannelPeer,
        limit: usize,
    ) -> Result<Vec<ChannelMessage>, RelayError>;

    /// Forward the listed messages from one channel to another.
    async fn forward_messages(&self, request: ForwardRequest) -> Result<(), RelayError>;

    /// List the account's dialogs (channels, groups, private chats).
    async fn get_dialogs(&self, limit: usize) -> Result<Vec<DialogInfo>, RelayError>;
}

/// Entry point the client calls whenever the account receives updates.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    /// Process one update envelope. Unrecognized update kinds are ignored.
    async fn handle(&self, envelope: UpdatesEnvelope) -> Result<(), RelayError>;
}

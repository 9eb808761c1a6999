// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared types used across the tgrelay workspace.
//!
//! Domain rows (`ForwardRule`, `ForwardLog`) are defined here so the storage,
//! engine, and RPC crates agree on one canonical shape. The second half of the
//! file is the Telegram wire contract: the update envelopes the upstream
//! client delivers and the request/response types of the outbound API.

use serde::{Deserialize, Serialize};

// --- Domain rows ---

/// A forwarding rule: watch `source_channel_id` for messages matching
/// `match_pattern` and relay them to `target_channel_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardRule {
    /// Monotone row id. SQLite AUTOINCREMENT guarantees ids are never reused,
    /// so forward logs stay unambiguous across rule deletion and recreation.
    pub id: i64,
    /// Channel the rule listens on.
    pub source_channel_id: i64,
    /// Display name of the source channel (informational).
    pub source_name: String,
    /// Access hash of the source channel, opaque to the engine.
    pub source_hash: i64,
    /// Channel matches are forwarded into.
    pub target_channel_id: i64,
    /// Display name of the target channel (informational).
    pub target_name: String,
    /// Access hash of the target channel, opaque to the engine.
    pub target_hash: i64,
    /// Regular-expression source text matched against message text.
    pub match_pattern: String,
    /// Disabled rules stay in the store but are excluded from the active set.
    pub enabled: bool,
    /// ISO 8601 creation timestamp, written by the store.
    pub created_at: String,
    /// ISO 8601 last-update timestamp, maintained by the store.
    pub updated_at: String,
}

impl ForwardRule {
    /// The source channel as an outbound API peer.
    pub fn source_peer(&self) -> InputChannelPeer {
        InputChannelPeer {
            channel_id: self.source_channel_id,
            access_hash: self.source_hash,
        }
    }

    /// The target channel as an outbound API peer.
    pub fn target_peer(&self) -> InputChannelPeer {
        InputChannelPeer {
            channel_id: self.target_channel_id,
            access_hash: self.target_hash,
        }
    }
}

/// Durable record of one successful forward.
///
/// `(rule_id, message_id)` is the dedup key; the store enforces its
/// uniqueness with a UNIQUE index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardLog {
    pub id: i64,
    pub rule_id: i64,
    pub message_id: i32,
    pub source_channel_id: i64,
    pub target_channel_id: i64,
    /// ISO 8601 creation timestamp, written by the store.
    pub created_at: String,
}

// --- Telegram wire contract ---

/// Update envelope delivered by the upstream client.
///
/// Mirrors the two MTProto shapes the forwarder cares about: a batch of
/// updates and a single short update. Anything else is dropped by the
/// client adapter before it reaches the engine.
#[derive(Debug, Clone)]
pub enum UpdatesEnvelope {
    /// An ordered batch of update entries.
    Batch(Vec<TelegramUpdate>),
    /// A single short update.
    Single(TelegramUpdate),
}

/// One update entry inside an envelope.
#[derive(Debug, Clone)]
pub enum TelegramUpdate {
    /// A new message posted to a channel.
    NewChannelMessage(ChannelMessage),
    /// Any update kind the engine does not process.
    Other,
}

/// A message as seen by the engine: id, text, and originating peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    /// Message id, unique within the peer.
    pub id: i32,
    /// Message text. Empty for media-only and service messages.
    pub text: String,
    /// Peer the message was posted in.
    pub peer: Peer,
}

impl ChannelMessage {
    /// The channel id when the message's peer is a channel.
    pub fn channel_id(&self) -> Option<i64> {
        match self.peer {
            Peer::Channel { channel_id } => Some(channel_id),
            _ => None,
        }
    }
}

/// An addressable entity on the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peer {
    User { user_id: i64 },
    Chat { chat_id: i64 },
    Channel { channel_id: i64 },
}

/// A channel addressed for an outbound API call: id plus access hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputChannelPeer {
    pub channel_id: i64,
    pub access_hash: i64,
}

/// Parameters of one outbound forward call.
///
/// `random_ids` carries one client-chosen nonce per entry in `ids`; the
/// platform uses it to deduplicate client retries on its side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardRequest {
    pub from_peer: InputChannelPeer,
    pub to_peer: InputChannelPeer,
    pub ids: Vec<i32>,
    pub random_ids: Vec<i64>,
}

/// One entry of the account's dialog list, as returned by the outbound API.
#[derive(Debug, Clone, Serialize)]
pub struct DialogInfo {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DialogKind,
    pub access_hash: i64,
    pub unread_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

/// Peer kind of a dialog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    User,
    Group,
    Channel,
}

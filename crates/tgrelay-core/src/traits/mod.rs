// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait contracts between the engine and the external Telegram client.

pub mod telegram;

pub use telegram::{TelegramApi, UpdateHandler};

// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the tgrelay workspace.
//!
//! Provides [`MockTelegramApi`] (scripted history, captured forwards,
//! failure injection) and [`EngineHarness`] (engine + temp SQLite + wired
//! mock) so behavioral tests stay short and deterministic.

pub mod harness;
pub mod mock_api;

pub use harness::{
    EngineHarness, batch, channel_message, settle, single, wait_for_forwards, wait_until_logged,
};
pub use mock_api::{MockTelegramApi, RecordedForward};

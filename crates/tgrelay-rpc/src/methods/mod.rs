// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RPC method implementations.

pub mod rules;
pub mod telegram;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tgrelay_core::RelayError;

/// Decode a method's params object.
pub(crate) fn decode_params<T: DeserializeOwned>(params: Value) -> Result<T, RelayError> {
    serde_json::from_value(params).map_err(|e| RelayError::InvalidParams(e.to_string()))
}

/// Serialize a method result.
pub(crate) fn to_result<T: serde::Serialize>(value: T) -> Result<Value, RelayError> {
    serde_json::to_value(value).map_err(|e| RelayError::Internal(e.to_string()))
}

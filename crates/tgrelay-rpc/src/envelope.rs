// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON-RPC 2.0 request and response envelopes.
//!
//! RPC-level failures travel inside a 200 response as an `error` object;
//! HTTP status codes are reserved for transport problems.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The request body could not be parsed as JSON.
pub const PARSE_ERROR: i64 = -32700;
/// The envelope is malformed (wrong or missing jsonrpc version).
pub const INVALID_REQUEST: i64 = -32600;
/// No method registered under the requested name.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Validation or execution failure inside a method.
pub const EXECUTION_ERROR: i64 = -32000;

/// An incoming JSON-RPC 2.0 request.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

/// The error member of a failed response.
#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// An outgoing JSON-RPC 2.0 response.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_missing_params_and_id() {
        let req: RpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"rules.list"}"#).unwrap();
        assert_eq!(req.jsonrpc, "2.0");
        assert_eq!(req.method, "rules.list");
        assert!(req.params.is_null());
        assert!(req.id.is_null());
    }

    #[test]
    fn request_without_method_fails_to_parse() {
        let result = serde_json::from_str::<RpcRequest>(r#"{"jsonrpc":"2.0"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn success_response_omits_error_member() {
        let resp = RpcResponse::success(Value::from(1), Value::from("ok"));
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""result":"ok""#));
        assert!(!json.contains("error"));
    }

    #[test]
    fn failure_response_omits_result_member() {
        let resp = RpcResponse::failure(Value::from("req-1"), EXECUTION_ERROR, "boom");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""code":-32000"#));
        assert!(json.contains(r#""message":"boom""#));
        assert!(!json.contains("result"));
    }
}

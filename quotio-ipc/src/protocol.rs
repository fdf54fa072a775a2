//! JSON-RPC 2.0 wire types and the error-code space this daemon uses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Malformed JSON on the wire.
pub const CODE_PARSE_ERROR: i64 = -32700;
/// The parsed JSON isn't a valid JSON-RPC request object.
pub const CODE_INVALID_REQUEST: i64 = -32600;
/// `method` doesn't name a registered handler.
pub const CODE_METHOD_NOT_FOUND: i64 = -32601;
/// `params` didn't match what the handler expected.
pub const CODE_INVALID_PARAMS: i64 = -32602;
/// The handler panicked or returned an error it didn't map to an
/// application code.
pub const CODE_INTERNAL_ERROR: i64 = -32603;

/// The child proxy isn't running.
pub const CODE_PROXY_NOT_RUNNING: i64 = 1001;
/// A credential operation failed authentication.
pub const CODE_AUTH_FAILED: i64 = 1002;
/// No such provider.
pub const CODE_PROVIDER_NOT_FOUND: i64 = 1003;
/// No such account ("agent" in the method catalog's naming).
pub const CODE_AGENT_NOT_FOUND: i64 = 1004;
/// A config key/value operation failed.
pub const CODE_CONFIG_ERROR: i64 = 1005;
/// `daemon.start` was called while an instance already owns the PID file.
pub const CODE_DAEMON_ALREADY_RUNNING: i64 = 1006;
/// An operation requiring a running daemon was attempted against none.
pub const CODE_DAEMON_NOT_RUNNING: i64 = 1007;

/// One incoming JSON-RPC request or notification (no `id` means
/// notification: never produces a response).
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be `"2.0"`; deserialized but not otherwise enforced.
    #[serde(default, rename = "jsonrpc")]
    pub jsonrpc: Option<String>,
    /// Absent for a notification.
    #[serde(default)]
    pub id: Option<Value>,
    /// Method name, e.g. `"daemon.ping"`.
    pub method: String,
    /// Method parameters, defaulting to `null` when omitted.
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    /// `true` if this message carries no `id` and therefore expects no
    /// response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// One outgoing JSON-RPC response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Echoes the request's `id`.
    pub id: Value,
    /// The handler's result, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The error, on failure. Exactly one of `result`/`error` is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    /// Builds a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Builds an error response.
    pub fn error(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// A JSON-RPC error object. Never carries a Rust `Display` string directly
/// — handlers and transport code map into this at the boundary so clients
/// see a stable code/message pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    /// One of the `CODE_*` constants in this module.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Optional structured detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    /// Builds an error with no structured detail.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Builds an error carrying structured detail.
    pub fn with_data(code: i64, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// `-32601 Method not found`.
    pub fn method_not_found(method: &str) -> Self {
        Self::new(CODE_METHOD_NOT_FOUND, format!("method not found: {method}"))
    }

    /// `-32700 Parse error`.
    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::new(CODE_PARSE_ERROR, format!("parse error: {detail}"))
    }

    /// `-32600 Invalid Request`.
    pub fn invalid_request(detail: impl std::fmt::Display) -> Self {
        Self::new(CODE_INVALID_REQUEST, format!("invalid request: {detail}"))
    }

    /// `-32602 Invalid params`.
    pub fn invalid_params(detail: impl std::fmt::Display) -> Self {
        Self::new(CODE_INVALID_PARAMS, format!("invalid params: {detail}"))
    }

    /// `-32603 Internal error`.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        Self::new(CODE_INTERNAL_ERROR, format!("internal error: {detail}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_without_id_is_a_notification() {
        let req: JsonRpcRequest = serde_json::from_str(r#"{"jsonrpc":"2.0","method":"stats.add","params":{}}"#).unwrap();
        assert!(req.is_notification());
    }

    #[test]
    fn request_with_id_is_not_a_notification() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"method":"daemon.ping","params":{}}"#).unwrap();
        assert!(!req.is_notification());
    }

    #[test]
    fn success_response_serializes_without_error_field() {
        let resp = JsonRpcResponse::success(Value::from(1), serde_json::json!({"pong": true}));
        let s = serde_json::to_string(&resp).unwrap();
        assert!(!s.contains("\"error\""));
        assert!(s.contains("\"pong\":true"));
    }

    #[test]
    fn error_response_serializes_without_result_field() {
        let resp = JsonRpcResponse::error(Value::from(1), RpcError::method_not_found("nope"));
        let s = serde_json::to_string(&resp).unwrap();
        assert!(!s.contains("\"result\""));
        assert!(s.contains("-32601"));
    }
}

//! A2A error types: JSON-RPC error codes, [`RpcError`] and [`A2AError`].
//!
//! Everything the JSON-RPC path can fail with is an [`RpcError`]: either one
//! synthesized locally (network failure, malformed envelope) with
//! [`INTERNAL_ERROR`], or one relayed verbatim from the remote agent.
//! Discovery and stream establishment have their own variants.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Standard JSON-RPC 2.0 error codes
// ---------------------------------------------------------------------------

/// Invalid JSON was received by the server.
pub const PARSE_ERROR: i64 = -32700;

/// The JSON sent is not a valid Request object.
pub const INVALID_REQUEST: i64 = -32600;

/// The method does not exist / is not available.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// Invalid method parameter(s).
pub const INVALID_PARAMS: i64 = -32602;

/// Internal JSON-RPC error. Also used for every client-side failure.
pub const INTERNAL_ERROR: i64 = -32603;

// ---------------------------------------------------------------------------
// A2A-specific error codes
// ---------------------------------------------------------------------------

/// The requested task was not found.
pub const TASK_NOT_FOUND: i64 = -32001;

/// The task cannot be canceled in its current state.
pub const TASK_NOT_CANCELABLE: i64 = -32002;

/// Push notifications are not supported by this agent.
pub const PUSH_NOTIFICATION_NOT_SUPPORTED: i64 = -32003;

/// The requested operation is not supported.
pub const UNSUPPORTED_OPERATION: i64 = -32004;

/// The content type is not supported.
pub const CONTENT_TYPE_NOT_SUPPORTED: i64 = -32005;

// ---------------------------------------------------------------------------
// RpcError
// ---------------------------------------------------------------------------

/// A JSON-RPC error: numeric code, message, and optional structured data.
///
/// This is also the wire shape of the `error` member of a JSON-RPC response,
/// so it deserializes directly from an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("JSON-RPC error {code}: {message}")]
pub struct RpcError {
    /// Error code.
    pub code: i64,

    /// Human-readable error message.
    pub message: String,

    /// Optional structured error data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    /// Create an error with the given code and message and no data.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an [`INTERNAL_ERROR`] with the given message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }

    /// Attach structured data (builder-style).
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Build an error from the raw `error` member of a response envelope.
    ///
    /// A well-formed `{code, message, data?}` object is taken as-is. Anything
    /// else keeps whatever code and message it has, falls back to
    /// [`INTERNAL_ERROR`] otherwise, and carries the raw value as `data`.
    pub fn from_wire(value: serde_json::Value) -> Self {
        if let Ok(error) = serde_json::from_value::<RpcError>(value.clone()) {
            return error;
        }
        let code = value
            .get("code")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(INTERNAL_ERROR);
        let message = match value.get("message").and_then(serde_json::Value::as_str) {
            Some(message) => message.to_string(),
            None => format!("Malformed JSON-RPC error received from server: {value}"),
        };
        Self::new(code, message).with_data(value)
    }

    /// Returns `true` if this error was synthesized for a client-side failure
    /// or the remote agent reported an internal error.
    pub fn is_internal(&self) -> bool {
        self.code == INTERNAL_ERROR
    }
}

// ---------------------------------------------------------------------------
// A2AError enum
// ---------------------------------------------------------------------------

/// Unified error type for discovery, transport, and protocol failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum A2AError {
    /// An agent reference could not be resolved to an agent endpoint
    /// (missing DID fragment, unmatched service, wrong service type,
    /// missing endpoint, unsupported DID method).
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// A JSON-RPC error, either synthesized locally or relayed from the agent.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// Non-2xx HTTP response where no JSON-RPC error could be extracted.
    #[error("HTTP error {status} {reason}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
        /// Response body text (may be empty).
        body: String,
    },

    /// Transport-level error outside the JSON-RPC request path
    /// (document fetch failed, stream read failed).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A fetched document was not valid JSON or did not have the expected shape.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// Invalid client configuration (bad URL, bad header).
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience result type for A2A operations.
pub type A2AResult<T> = Result<T, A2AError>;

impl A2AError {
    /// Create an [`A2AError::Rpc`] carrying an [`INTERNAL_ERROR`].
    pub fn internal(message: impl Into<String>) -> Self {
        A2AError::Rpc(RpcError::internal(message))
    }

    /// Returns the JSON-RPC error code for this error.
    ///
    /// Variants that do not originate from a JSON-RPC error object map to
    /// [`INTERNAL_ERROR`].
    pub fn code(&self) -> i64 {
        match self {
            A2AError::Rpc(err) => err.code,
            A2AError::Resolution(_)
            | A2AError::Http { .. }
            | A2AError::Transport(_)
            | A2AError::InvalidJson(_)
            | A2AError::Config(_) => INTERNAL_ERROR,
        }
    }

    /// Returns the inner [`RpcError`] if this is a JSON-RPC error.
    pub fn as_rpc(&self) -> Option<&RpcError> {
        match self {
            A2AError::Rpc(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for A2AError {
    fn from(err: serde_json::Error) -> Self {
        A2AError::InvalidJson(err.to_string())
    }
}

impl From<url::ParseError> for A2AError {
    fn from(err: url::ParseError) -> Self {
        A2AError::Config(format!("invalid URL: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_match_protocol() {
        assert_eq!(PARSE_ERROR, -32700);
        assert_eq!(INVALID_REQUEST, -32600);
        assert_eq!(METHOD_NOT_FOUND, -32601);
        assert_eq!(INVALID_PARAMS, -32602);
        assert_eq!(INTERNAL_ERROR, -32603);
        assert_eq!(TASK_NOT_FOUND, -32001);
        assert_eq!(TASK_NOT_CANCELABLE, -32002);
        assert_eq!(PUSH_NOTIFICATION_NOT_SUPPORTED, -32003);
        assert_eq!(UNSUPPORTED_OPERATION, -32004);
        assert_eq!(CONTENT_TYPE_NOT_SUPPORTED, -32005);
    }

    #[test]
    fn rpc_error_deserializes_from_wire() {
        let err: RpcError = serde_json::from_value(serde_json::json!({
            "code": -32000,
            "message": "boom",
            "data": {"retry": false}
        }))
        .unwrap();
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "boom");
        assert_eq!(err.data, Some(serde_json::json!({"retry": false})));
    }

    #[test]
    fn from_wire_keeps_well_formed_errors() {
        let err = RpcError::from_wire(serde_json::json!({"code": -32001, "message": "gone"}));
        assert_eq!(err, RpcError::new(TASK_NOT_FOUND, "gone"));
    }

    #[test]
    fn from_wire_tolerates_partial_errors() {
        let raw = serde_json::json!({"code": -32000});
        let err = RpcError::from_wire(raw.clone());
        assert_eq!(err.code, -32000);
        assert!(err.message.starts_with("Malformed JSON-RPC error"));
        assert_eq!(err.data, Some(raw));

        let err = RpcError::from_wire(serde_json::json!("boom"));
        assert_eq!(err.code, INTERNAL_ERROR);
        assert_eq!(err.data, Some(serde_json::json!("boom")));

        let err = RpcError::from_wire(serde_json::json!({"code": 1.5, "message": "odd"}));
        assert_eq!(err.code, INTERNAL_ERROR);
        assert_eq!(err.message, "odd");
    }

    #[test]
    fn rpc_error_without_data_omits_field() {
        let json = serde_json::to_value(RpcError::new(TASK_NOT_FOUND, "gone")).unwrap();
        assert!(json.get("data").is_none());
    }

    #[test]
    fn rpc_variant_preserves_code() {
        let err: A2AError = RpcError::new(TASK_NOT_FOUND, "Task not found").into();
        assert_eq!(err.code(), TASK_NOT_FOUND);
        assert_eq!(err.to_string(), "JSON-RPC error -32001: Task not found");
    }

    #[test]
    fn client_side_errors_map_to_internal() {
        assert_eq!(A2AError::Transport("refused".into()).code(), INTERNAL_ERROR);
        assert_eq!(A2AError::Resolution("no fragment".into()).code(), INTERNAL_ERROR);
        let http = A2AError::Http {
            status: 503,
            reason: "Service Unavailable".into(),
            body: "down".into(),
        };
        assert_eq!(http.code(), INTERNAL_ERROR);
        assert_eq!(http.to_string(), "HTTP error 503 Service Unavailable: down");
    }

    #[test]
    fn internal_constructor_is_rpc() {
        let err = A2AError::internal("bad envelope");
        let rpc = err.as_rpc().unwrap();
        assert!(rpc.is_internal());
        assert_eq!(rpc.message, "bad envelope");
    }
}

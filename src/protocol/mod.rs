//! JSON-RPC 2.0 message types and the slice of MCP the client speaks.
//!
//! Only the messages needed for tool discovery, tool calls and cancellation
//! are modelled; capability negotiation and streaming are not.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{Error, ProgressToken, Result};

/// JSON-RPC protocol version string.
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP method names used by the client.
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
    /// Reserved notification telling the server to abandon a request.
    pub const CANCELLED: &str = "notifications/cancelled";
}

/// Well-known JSON-RPC error codes.
pub mod error_codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i64 = -32700;
    /// The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i64 = -32600;
    /// The method does not exist or is not available.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Invalid method parameters.
    pub const INVALID_PARAMS: i64 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i64 = -32603;
}

// ─── JSON-RPC 2.0 ───────────────────────────────────────────────────────────

/// JSON-RPC 2.0 request message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: &str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC 2.0 notification (no `id`, no response).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: &str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC 2.0 response message (success or error).
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub result: Option<Value>,
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Extract the result, converting an error object into [`Error::Rpc`].
    pub fn into_result(self) -> Result<Value> {
        if let Some(err) = self.error {
            return Err(Error::Rpc {
                code: err.code,
                message: err.message,
                data: err.data,
            });
        }

        self.result.ok_or_else(|| {
            Error::rpc(
                error_codes::INTERNAL_ERROR,
                "response missing both result and error",
            )
        })
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// ─── MCP payloads ───────────────────────────────────────────────────────────

/// Per-call metadata attached to `tools/call`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallMeta {
    pub progress_token: ProgressToken,
}

/// Parameters of a `tools/call` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Map<String, Value>,
    #[serde(rename = "_meta")]
    pub meta: CallMeta,
}

/// Parameters of a `notifications/cancelled` notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledParams {
    pub request_id: ProgressToken,
    pub reason: String,
}

/// Parameters of a paginated `tools/list` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_omits_absent_params() {
        let req = JsonRpcRequest::new(1, methods::TOOLS_LIST, None);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"id\":1"));
        assert!(!json.contains("params"));
    }

    #[test]
    fn test_notification_has_no_id() {
        let note = JsonRpcNotification::new(methods::CANCELLED, Some(json!({"reason": "x"})));
        let value = serde_json::to_value(&note).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["method"], "notifications/cancelled");
    }

    #[test]
    fn test_call_params_wire_shape() {
        let token = ProgressToken::from_string("tok-1".to_string()).unwrap();
        let mut arguments = Map::new();
        arguments.insert("query".to_string(), json!("rust"));
        let params = CallToolParams {
            name: "search".to_string(),
            arguments,
            meta: CallMeta {
                progress_token: token,
            },
        };

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "search",
                "arguments": {"query": "rust"},
                "_meta": {"progressToken": "tok-1"}
            })
        );
    }

    #[test]
    fn test_cancelled_params_wire_shape() {
        let params = CancelledParams {
            request_id: ProgressToken::from_string("tok-2".to_string()).unwrap(),
            reason: "too slow".to_string(),
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value, json!({"requestId": "tok-2", "reason": "too slow"}));
    }

    #[test]
    fn test_error_response_into_rpc_error() {
        let raw = r#"{"jsonrpc":"2.0","id":7,"error":{"code":-32602,"message":"bad"}}"#;
        let resp: JsonRpcResponse = serde_json::from_str(raw).unwrap();
        match resp.into_result() {
            Err(Error::Rpc { code, message, .. }) => {
                assert_eq!(code, error_codes::INVALID_PARAMS);
                assert_eq!(message, "bad");
            }
            other => panic!("expected rpc error, got {:?}", other),
        }
    }

    #[test]
    fn test_response_missing_both_is_internal_error() {
        let resp: JsonRpcResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
        let err = resp.into_result().unwrap_err();
        assert_eq!(err.rpc_code(), Some(error_codes::INTERNAL_ERROR));
    }
}

//! The only shape a tool call ever returns.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::ProgressToken;

/// Stable failure taxonomy surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No usable server handle.
    NotConnected,
    /// Local deadline exceeded.
    Timeout,
    /// 401 / token errors; the caller should re-authenticate.
    AuthenticationFailure,
    /// 404 or method-not-found.
    NotFound,
    /// Protocol invalid-params, or arguments rejected before sending.
    InvalidArguments,
    /// Protocol internal-error or anything uncategorized.
    InternalRemoteError,
    /// Sending a message failed.
    TransportError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotConnected => "not_connected",
            ErrorKind::Timeout => "timeout",
            ErrorKind::AuthenticationFailure => "authentication_failure",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidArguments => "invalid_arguments",
            ErrorKind::InternalRemoteError => "internal_remote_error",
            ErrorKind::TransportError => "transport_error",
        }
    }
}

/// A failed call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallFailure {
    pub kind: ErrorKind,
    pub message: String,
    pub status_code: u16,
    pub correlation_token: Option<ProgressToken>,
    pub requires_authentication: bool,
    /// Deadline that expired, for timeout failures.
    pub timeout_seconds: Option<f64>,
}

impl CallFailure {
    pub fn new(kind: ErrorKind, status_code: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code,
            correlation_token: None,
            requires_authentication: false,
            timeout_seconds: None,
        }
    }

    pub fn with_token(mut self, token: ProgressToken) -> Self {
        self.correlation_token = Some(token);
        self
    }

    /// Local deadline exceeded (408).
    pub fn timed_out(seconds: f64, token: ProgressToken) -> Self {
        Self {
            timeout_seconds: Some(seconds),
            ..Self::new(
                ErrorKind::Timeout,
                408,
                format!("Tool execution timed out after {} seconds", seconds),
            )
            .with_token(token)
        }
    }
}

/// Outcome of one tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    Success {
        payload: Value,
        correlation_token: ProgressToken,
    },
    Failure(CallFailure),
}

impl CallResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CallResult::Success { .. })
    }

    pub fn correlation_token(&self) -> Option<&ProgressToken> {
        match self {
            CallResult::Success {
                correlation_token, ..
            } => Some(correlation_token),
            CallResult::Failure(f) => f.correlation_token.as_ref(),
        }
    }

    pub fn failure(&self) -> Option<&CallFailure> {
        match self {
            CallResult::Failure(f) => Some(f),
            CallResult::Success { .. } => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.failure().map(|f| f.status_code)
    }

    /// The call reached the tool, but the tool itself reported an error
    /// (`isError: true` in the result).
    pub fn is_tool_error(&self) -> bool {
        match self {
            CallResult::Success { payload, .. } => payload
                .get("isError")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            CallResult::Failure(_) => false,
        }
    }

    /// JSON surface handed to HTTP-layer callers.
    pub fn to_response(&self, tool_name: &str) -> ToolCallResponse {
        match self {
            CallResult::Success {
                payload,
                correlation_token,
            } => ToolCallResponse {
                success: true,
                data: Some(payload.clone()),
                tool_name: Some(tool_name.to_string()),
                progress_token: Some(correlation_token.clone()),
                ..ToolCallResponse::default()
            },
            CallResult::Failure(f) => ToolCallResponse {
                success: false,
                error: Some(f.message.clone()),
                status_code: Some(f.status_code),
                error_type: Some(f.kind),
                tool_name: Some(tool_name.to_string()),
                timeout: f.timeout_seconds,
                progress_token: f.correlation_token.clone(),
                requires_authentication: f.requires_authentication.then_some(true),
                ..ToolCallResponse::default()
            },
        }
    }
}

impl From<CallFailure> for CallResult {
    fn from(failure: CallFailure) -> Self {
        CallResult::Failure(failure)
    }
}

/// Serialized call result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_token: Option<ProgressToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_authentication: Option<bool>,
}

/// Join the `text` items of a `tools/call` result's `content` array.
///
/// Returns `None` when the payload has no text content.
pub fn content_text(payload: &Value) -> Option<String> {
    let texts: Vec<&str> = payload
        .get("content")?
        .as_array()?
        .iter()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|item| item.get("text").and_then(Value::as_str))
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    }
}

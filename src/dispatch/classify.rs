//! Error classification: raw failures onto a stable taxonomy.
//!
//! Classification is a prioritized rule list. The first rule that claims an
//! error decides its status code and kind. The order lives in
//! [`CLASSIFICATION_ORDER`] and is covered by tests. Authentication markers
//! win over everything; a structured protocol code wins over not-found text.
//! That reverses the text-first order (404 text, then protocol code), so an
//! invalid-params error whose message mentions "Not Found" is a 400.

use crate::protocol::error_codes;
use crate::types::Error;

use super::result::{CallFailure, ErrorKind};

/// Substrings that mark an authentication failure.
const AUTH_MARKERS: [&str; 4] = ["401", "Unauthorized", "invalid_token", "token_expired"];

/// Substrings that mark a missing endpoint or tool.
const NOT_FOUND_MARKERS: [&str; 2] = ["404", "Not Found"];

pub const AUTHENTICATION_MESSAGE: &str =
    "Authentication failed: the server rejected the credentials or the token has expired. Re-authenticate and try again.";

/// Failure as seen by the classifier: message text plus optional protocol code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawError {
    pub message: String,
    pub code: Option<i64>,
}

impl RawError {
    pub fn new(message: impl Into<String>, code: Option<i64>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

impl From<&Error> for RawError {
    fn from(err: &Error) -> Self {
        Self {
            message: err.detail(),
            code: err.rpc_code(),
        }
    }
}

/// Classifier verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub message: String,
    pub status_code: u16,
    pub kind: ErrorKind,
    pub requires_authentication: bool,
}

impl Classification {
    fn new(kind: ErrorKind, status_code: u16, message: String) -> Self {
        Self {
            message,
            status_code,
            kind,
            requires_authentication: false,
        }
    }

    pub fn into_failure(self) -> CallFailure {
        CallFailure {
            requires_authentication: self.requires_authentication,
            ..CallFailure::new(self.kind, self.status_code, self.message)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationRule {
    /// 401 / token markers in the message text.
    Authentication,
    /// Structured JSON-RPC error code.
    ProtocolCode,
    /// 404 markers in the message text.
    NotFoundText,
    /// Everything else.
    Fallback,
}

/// Rule precedence, first match wins.
pub const CLASSIFICATION_ORDER: [ClassificationRule; 4] = [
    ClassificationRule::Authentication,
    ClassificationRule::ProtocolCode,
    ClassificationRule::NotFoundText,
    ClassificationRule::Fallback,
];

impl ClassificationRule {
    /// Apply this rule alone. `None` means the rule does not claim the error.
    pub fn apply(self, raw: &RawError, default_status: u16) -> Option<Classification> {
        let text = raw.message.as_str();
        match self {
            ClassificationRule::Authentication => {
                AUTH_MARKERS.iter().any(|m| text.contains(m)).then(|| Classification {
                    requires_authentication: true,
                    ..Classification::new(
                        ErrorKind::AuthenticationFailure,
                        401,
                        AUTHENTICATION_MESSAGE.to_string(),
                    )
                })
            }
            ClassificationRule::NotFoundText => {
                NOT_FOUND_MARKERS.iter().any(|m| text.contains(m)).then(|| {
                    Classification::new(
                        ErrorKind::NotFound,
                        404,
                        format!(
                            "Tool or endpoint not found (404). The server may require authentication that is not configured. Original error: {}",
                            text
                        ),
                    )
                })
            }
            ClassificationRule::ProtocolCode => raw.code.map(|code| {
                let (kind, status) = match code {
                    error_codes::METHOD_NOT_FOUND => (ErrorKind::NotFound, 404),
                    error_codes::INVALID_PARAMS => (ErrorKind::InvalidArguments, 400),
                    error_codes::INTERNAL_ERROR => (ErrorKind::InternalRemoteError, 500),
                    _ => (ErrorKind::InternalRemoteError, default_status),
                };
                Classification::new(kind, status, format!("MCP error {}: {}", code, text))
            }),
            ClassificationRule::Fallback => Some(Classification::new(
                ErrorKind::InternalRemoteError,
                default_status,
                format!("Failed to call tool: {}", text),
            )),
        }
    }
}

/// Classify `raw`, falling back to `default_status` when nothing specific
/// applies. Never fails.
pub fn classify(raw: &RawError, default_status: u16) -> Classification {
    CLASSIFICATION_ORDER
        .iter()
        .find_map(|rule| rule.apply(raw, default_status))
        .unwrap_or_else(|| {
            Classification::new(
                ErrorKind::InternalRemoteError,
                default_status,
                format!("Failed to call tool: {}", raw.message),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(message: &str) -> RawError {
        RawError::new(message, None)
    }

    #[test]
    fn test_order_is_auth_then_code_then_not_found_then_fallback() {
        assert_eq!(
            CLASSIFICATION_ORDER,
            [
                ClassificationRule::Authentication,
                ClassificationRule::ProtocolCode,
                ClassificationRule::NotFoundText,
                ClassificationRule::Fallback,
            ]
        );
    }

    #[test]
    fn test_auth_markers() {
        for message in [
            "HTTP 401",
            "Unauthorized",
            "error=invalid_token",
            "token_expired at 12:00",
        ] {
            let c = classify(&text(message), 500);
            assert_eq!(c.status_code, 401, "{}", message);
            assert!(c.requires_authentication);
            assert_eq!(c.kind, ErrorKind::AuthenticationFailure);
            assert_eq!(c.message, AUTHENTICATION_MESSAGE);
        }
    }

    #[test]
    fn test_auth_beats_not_found_text() {
        let c = classify(&text("HTTP 404 Not Found after 401 Unauthorized"), 500);
        assert_eq!(c.status_code, 401);
        assert!(c.requires_authentication);
    }

    #[test]
    fn test_auth_beats_protocol_code() {
        let c = classify(&RawError::new("invalid_token", Some(-32602)), 500);
        assert_eq!(c.status_code, 401);
    }

    #[test]
    fn test_not_found_text() {
        let c = classify(&text("HTTP 404 Not Found: /mcp"), 500);
        assert_eq!(c.status_code, 404);
        assert_eq!(c.kind, ErrorKind::NotFound);
        assert!(!c.requires_authentication);
        assert!(c.message.contains("authentication"));
        assert!(c.message.contains("/mcp"));
    }

    #[test]
    fn test_protocol_code_beats_not_found_text() {
        let c = classify(&RawError::new("resource Not Found", Some(-32602)), 500);
        assert_eq!(c.status_code, 400);
        assert_eq!(c.kind, ErrorKind::InvalidArguments);
        assert_eq!(c.message, "MCP error -32602: resource Not Found");
    }

    #[test]
    fn test_protocol_codes() {
        let cases = [
            (-32601, 404, ErrorKind::NotFound),
            (-32602, 400, ErrorKind::InvalidArguments),
            (-32603, 500, ErrorKind::InternalRemoteError),
        ];
        for (code, status, kind) in cases {
            let c = classify(&RawError::new("boom", Some(code)), 500);
            assert_eq!(c.status_code, status);
            assert_eq!(c.kind, kind);
            assert_eq!(c.message, format!("MCP error {}: boom", code));
        }
    }

    #[test]
    fn test_unknown_protocol_code_uses_default_status() {
        let c = classify(&RawError::new("odd", Some(-32000)), 502);
        assert_eq!(c.status_code, 502);
        assert_eq!(c.kind, ErrorKind::InternalRemoteError);
        assert!(c.message.contains("-32000"));
    }

    #[test]
    fn test_fallback() {
        let c = classify(&text("connection reset by peer"), 500);
        assert_eq!(c.status_code, 500);
        assert_eq!(c.kind, ErrorKind::InternalRemoteError);
        assert_eq!(c.message, "Failed to call tool: connection reset by peer");
    }

    #[test]
    fn test_rules_in_isolation() {
        let raw = text("plain failure");
        assert!(ClassificationRule::Authentication.apply(&raw, 500).is_none());
        assert!(ClassificationRule::NotFoundText.apply(&raw, 500).is_none());
        assert!(ClassificationRule::ProtocolCode.apply(&raw, 500).is_none());
        assert!(ClassificationRule::Fallback.apply(&raw, 500).is_some());
    }

    #[test]
    fn test_from_error_uses_rpc_fields() {
        let err = Error::rpc(-32602, "missing 'path'");
        let raw = RawError::from(&err);
        assert_eq!(raw, RawError::new("missing 'path'", Some(-32602)));
    }

    #[test]
    fn test_into_failure_keeps_auth_flag() {
        let failure = classify(&text("Unauthorized"), 500).into_failure();
        assert!(failure.requires_authentication);
        assert_eq!(failure.status_code, 401);
        assert!(failure.correlation_token.is_none());
    }
}

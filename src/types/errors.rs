//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context. Errors stay inside the crate's own
//! plumbing: the dispatcher converts every one of them into a
//! [`CallResult`](crate::dispatch::CallResult) before returning to callers.

use serde_json::Value;
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the tool client.
#[derive(Error, Debug)]
pub enum Error {
    /// Validation errors (bad caller input, bad arguments).
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Server handle exists but holds no live connection.
    #[error("server not connected: {0}")]
    NotConnected(String),

    /// Handle exposes no way to send protocol messages.
    #[error("transport unavailable for server '{0}'")]
    TransportUnavailable(String),

    /// Transport-level failure (HTTP status, I/O, malformed frame).
    #[error("transport error: {0}")]
    Transport(String),

    /// Server answered with a JSON-RPC error object.
    #[error("server error [{code}]: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    /// Timeout while talking to the server.
    #[error("timeout: {0}")]
    Timeout(String),

    /// In-flight work abandoned locally.
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// Internal errors.
    #[error("internal error: {0}")]
    Internal(String),

    /// Configuration errors (unreadable or malformed config file).
    #[error("config error: {0}")]
    Config(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client errors.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Structured JSON-RPC error code, when the server supplied one.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            Error::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Message text without the variant prefix for errors that carry a
    /// remote or transport message verbatim; the display form otherwise.
    pub fn detail(&self) -> String {
        match self {
            Error::Rpc { message, .. } => message.clone(),
            Error::Transport(message) | Error::Timeout(message) => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn not_connected(server: impl Into<String>) -> Self {
        Self::NotConnected(server.into())
    }

    pub fn transport_unavailable(server: impl Into<String>) -> Self {
        Self::TransportUnavailable(server.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

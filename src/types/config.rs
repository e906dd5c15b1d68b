//! Configuration structures.
//!
//! Configuration is loaded from an optional JSON file and overlaid with
//! environment variables. Every section falls back to its defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::errors::{Error, Result};

/// Environment variable carrying a bearer token for HTTP transports.
pub const ENV_AUTH_TOKEN: &str = "TOOLBRIDGE_AUTH_TOKEN";

/// Environment variable selecting the log format (`json` or plain text).
pub const ENV_LOG_FORMAT: &str = "TOOLBRIDGE_LOG_FORMAT";

/// Global client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Call dispatch behaviour.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// HTTP transport configuration.
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Load configuration from a JSON file. Missing sections use defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::config(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Overlay values taken from the process environment.
    pub fn apply_env(mut self) -> Self {
        if let Ok(token) = std::env::var(ENV_AUTH_TOKEN) {
            if !token.is_empty() {
                self.http.auth_token = Some(token);
            }
        }
        if let Ok(format) = std::env::var(ENV_LOG_FORMAT) {
            self.observability.json_logs = format.eq_ignore_ascii_case("json");
        }
        self
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Call dispatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Status code used when no classification rule matches.
    pub default_status_code: u16,

    /// Reason sent with `notifications/cancelled`. `{seconds}` is replaced
    /// with the deadline that expired.
    pub cancel_reason: String,

    /// Upper bound on how long the background task of a timed-out call
    /// keeps trying to hand the cancellation notification to the transport.
    /// The caller never waits for it.
    #[serde(with = "humantime_serde")]
    pub cancel_grace: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_status_code: 500,
            cancel_reason: "Request timed out after {seconds} seconds".to_string(),
            cancel_grace: Duration::from_secs(2),
        }
    }
}

impl DispatchConfig {
    /// Render the cancellation reason for a deadline of `seconds`.
    pub fn cancel_reason_for(&self, seconds: f64) -> String {
        self.cancel_reason.replace("{seconds}", &seconds.to_string())
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout applied by the HTTP client.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Bearer token sent in the `Authorization` header.
    pub auth_token: Option<String>,

    /// Protocol revision advertised in the `MCP-Protocol-Version` header.
    pub protocol_version: String,

    /// Maximum number of bytes of an error body quoted in error messages.
    pub max_error_body: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            auth_token: None,
            protocol_version: "2025-03-26".to_string(),
            max_error_body: 500,
        }
    }
}

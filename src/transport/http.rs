//! JSON-RPC 2.0 over HTTP POST.
//!
//! One POST per message. Responses may come back as plain JSON or as a
//! single-event SSE body; both are accepted. The `Mcp-Session-Id` header
//! returned by the server is echoed on every subsequent message.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use super::Transport;
use crate::protocol::{methods, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use crate::types::{Error, HttpConfig, Result, SessionId};

const SESSION_HEADER: &str = "mcp-session-id";
const PROTOCOL_VERSION_HEADER: &str = "mcp-protocol-version";

/// HTTP transport for a single server endpoint.
#[derive(Debug)]
pub struct HttpTransport {
    url: String,
    client: Client,
    auth_token: Option<String>,
    protocol_version: String,
    request_timeout: Duration,
    max_error_body: usize,
    next_id: AtomicU64,
    session_id: RwLock<Option<SessionId>>,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, config: &HttpConfig) -> Self {
        Self::with_client(url, Client::new(), config)
    }

    /// Build on a caller-provided client (shared connection pool).
    pub fn with_client(url: impl Into<String>, client: Client, config: &HttpConfig) -> Self {
        Self {
            url: url.into(),
            client,
            auth_token: config.auth_token.clone(),
            protocol_version: config.protocol_version.clone(),
            request_timeout: config.request_timeout,
            max_error_body: config.max_error_body,
            next_id: AtomicU64::new(1),
            session_id: RwLock::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn session_id(&self) -> Option<SessionId> {
        self.session_id.read().await.clone()
    }

    /// Run the `initialize` handshake and confirm it with
    /// `notifications/initialized`. Returns the server's reply.
    pub async fn initialize(&self, client_name: &str, client_version: &str) -> Result<Value> {
        let params = json!({
            "protocolVersion": self.protocol_version,
            "capabilities": {},
            "clientInfo": {"name": client_name, "version": client_version},
        });
        let reply = self.request(methods::INITIALIZE, Some(params)).await?;
        self.notify(methods::INITIALIZED, None).await?;
        let server = reply
            .pointer("/serverInfo/name")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown");
        tracing::info!(url = %self.url, server, "MCP session initialized");
        Ok(reply)
    }

    fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// POST one JSON-RPC message. Returns the decoded body, or `None` when
    /// the server accepted it without a body (notifications).
    async fn post(&self, body: &Value) -> Result<Option<Value>> {
        let mut req = self
            .client
            .post(&self.url)
            .header(ACCEPT, "application/json, text/event-stream")
            .header(PROTOCOL_VERSION_HEADER, &self.protocol_version)
            .timeout(self.request_timeout)
            .json(body);

        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token);
        }
        if let Some(session) = self.session_id.read().await.as_ref() {
            req = req.header(SESSION_HEADER, session.as_str());
        }

        let response = req.send().await.map_err(|e| self.send_error(e))?;

        if let Some(session) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| SessionId::from_string(v.to_string()).ok())
        {
            *self.session_id.write().await = Some(session);
        }

        let status = response.status();
        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("text/event-stream"))
            .unwrap_or(false);
        let text = response.text().await.map_err(|e| self.send_error(e))?;

        if !status.is_success() {
            return Err(Error::transport(format!(
                "HTTP {}: {}",
                status,
                truncate_str(text.trim(), self.max_error_body)
            )));
        }

        if status == StatusCode::ACCEPTED || text.trim().is_empty() {
            return Ok(None);
        }

        let payload = if is_event_stream {
            last_event_data(&text)
                .ok_or_else(|| Error::transport("event stream carried no JSON-RPC message"))?
        } else {
            text
        };

        Ok(Some(serde_json::from_str(&payload)?))
    }

    fn send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::timeout(format!(
                "Connection timeout after {}s waiting for {}",
                self.request_timeout.as_secs_f64(),
                self.url
            ))
        } else if err.is_connect() {
            Error::transport(format!("cannot reach {}: {}", self.url, err))
        } else {
            Error::Http(err)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_request_id();
        let body = serde_json::to_value(JsonRpcRequest::new(id, method, params))?;
        tracing::debug!(url = %self.url, method, id, "sending JSON-RPC request");

        let value = self.post(&body).await?.ok_or_else(|| {
            Error::transport(format!("empty response to '{}' request {}", method, id))
        })?;
        let response: JsonRpcResponse = serde_json::from_value(value)?;
        response.into_result()
    }

    async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        let body = serde_json::to_value(JsonRpcNotification::new(method, params))?;
        tracing::debug!(url = %self.url, method, "sending JSON-RPC notification");
        self.post(&body).await?;
        Ok(())
    }
}

/// Last `data:` payload of an SSE body that parses as JSON.
fn last_event_data(body: &str) -> Option<String> {
    let mut last = None;
    let mut current = String::new();

    for line in body.lines().chain(std::iter::once("")) {
        if let Some(data) = line.strip_prefix("data:") {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(data.trim_start());
        } else if line.trim().is_empty() && !current.is_empty() {
            if serde_json::from_str::<Value>(&current).is_ok() {
                last = Some(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }

    last
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let boundary = s
            .char_indices()
            .take_while(|(i, _)| *i < max_len)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(max_len);
        format!("{}...", &s[..boundary])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 5), "hello...");
    }

    #[test]
    fn test_last_event_data_picks_final_message() {
        let body = "event: message\ndata: {\"id\":1}\n\nevent: message\ndata: {\"id\":2}\n\n";
        assert_eq!(last_event_data(body).as_deref(), Some("{\"id\":2}"));
    }

    #[test]
    fn test_last_event_data_without_trailing_blank_line() {
        let body = "data: {\"jsonrpc\":\"2.0\",\"id\":3,\"result\":{}}";
        let data = last_event_data(body).unwrap();
        assert!(data.contains("\"id\":3"));
    }

    #[test]
    fn test_last_event_data_skips_non_json() {
        assert!(last_event_data("data: ping\n\n").is_none());
    }

    #[test]
    fn test_request_ids_increase() {
        let transport = HttpTransport::new("http://127.0.0.1:1/mcp", &HttpConfig::default());
        let a = transport.next_request_id();
        let b = transport.next_request_id();
        assert!(b > a);
    }
}

//! Tool catalog reader: ask a connected server which tools it exposes.
//!
//! Nothing is cached: every call re-queries the server. Failures never
//! escape; they are reported in [`ToolListing::error`] next to an empty list.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::protocol::{methods, ListToolsParams};
use crate::transport::ServerHandle;
use crate::types::{Error, Result};

/// Upper bound on `nextCursor` pages followed in one listing.
const MAX_PAGES: usize = 64;

/// Error reported for an absent or disconnected handle.
pub const NOT_CONNECTED_MESSAGE: &str = "Server not connected";

/// A tool as exposed by a server at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Adapt one raw `tools/list` entry, filling in missing fields.
    pub fn from_wire(raw: &Value) -> Self {
        let text = |key: &str| {
            raw.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            name: text("name"),
            description: text("description"),
            input_schema: raw
                .get("inputSchema")
                .filter(|s| s.is_object())
                .cloned()
                .unwrap_or_else(empty_schema),
        }
    }
}

fn empty_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

/// Result of a catalog query.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolListing {
    pub tools: Vec<ToolDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolListing {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            tools: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// List the tools of `handle`.
pub async fn list_server_tools(handle: Option<&ServerHandle>, server_name: &str) -> ToolListing {
    let Some(handle) = handle.filter(|h| h.is_connected()) else {
        return ToolListing::failed(NOT_CONNECTED_MESSAGE);
    };

    match fetch_all(handle).await {
        Ok(tools) => {
            tracing::debug!(server = server_name, count = tools.len(), "listed tools");
            ToolListing { tools, error: None }
        }
        Err(e) => ToolListing::failed(describe_failure(&e)),
    }
}

async fn fetch_all(handle: &ServerHandle) -> Result<Vec<ToolDescriptor>> {
    let transport = handle
        .transport()
        .ok_or_else(|| Error::transport_unavailable(handle.name()))?;

    let mut tools = Vec::new();
    let mut cursor: Option<String> = None;

    for _ in 0..MAX_PAGES {
        let params = match cursor.take() {
            Some(c) => Some(serde_json::to_value(ListToolsParams { cursor: Some(c) })?),
            None => None,
        };
        let page = transport.request(methods::TOOLS_LIST, params).await?;

        if let Some(entries) = page.get("tools").and_then(Value::as_array) {
            tools.extend(entries.iter().map(ToolDescriptor::from_wire));
        }

        match page.get("nextCursor").and_then(Value::as_str) {
            Some(next) if !next.is_empty() => cursor = Some(next.to_string()),
            _ => return Ok(tools),
        }
    }

    tracing::warn!(server = handle.name(), pages = MAX_PAGES, "tool list truncated");
    Ok(tools)
}

/// Connection timeouts are reported verbatim; anything else gets a prefix.
fn describe_failure(err: &Error) -> String {
    let message = err.detail();
    if message.to_ascii_lowercase().contains("connection timeout") {
        message
    } else {
        format!("Failed to list tools: {}", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use std::sync::Arc;

    fn handle_with(mock: MockTransport) -> ServerHandle {
        ServerHandle::connected("files", Arc::new(mock))
    }

    fn connected_mock() -> MockTransport {
        let mut mock = MockTransport::new();
        mock.expect_is_connected().return_const(true);
        mock
    }

    #[tokio::test]
    async fn test_absent_handle() {
        let listing = list_server_tools(None, "files").await;
        assert!(listing.tools.is_empty());
        assert_eq!(listing.error.as_deref(), Some("Server not connected"));
    }

    #[tokio::test]
    async fn test_disconnected_handle_sends_nothing() {
        let mut mock = MockTransport::new();
        mock.expect_is_connected().return_const(false);
        mock.expect_request().never();
        let handle = handle_with(mock);

        let listing = list_server_tools(Some(&handle), "files").await;
        assert_eq!(listing.error.as_deref(), Some("Server not connected"));
    }

    #[tokio::test]
    async fn test_adapts_entries_and_fills_missing_fields() {
        let mut mock = connected_mock();
        mock.expect_request()
            .withf(|method, params| method == "tools/list" && params.is_none())
            .times(1)
            .returning(|_, _| {
                Ok(json!({"tools": [
                    {"name": "read_file", "description": "Read a file",
                     "inputSchema": {"type": "object", "properties": {"path": {"type": "string"}}}},
                    {"name": "bare"}
                ]}))
            });
        let handle = handle_with(mock);

        let listing = list_server_tools(Some(&handle), "files").await;
        assert!(listing.error.is_none());
        assert_eq!(listing.tools.len(), 2);
        assert_eq!(listing.tools[0].name, "read_file");
        assert_eq!(listing.tools[0].input_schema["properties"]["path"]["type"], "string");
        assert_eq!(listing.tools[1].description, "");
        assert_eq!(listing.tools[1].input_schema, empty_schema());
    }

    #[tokio::test]
    async fn test_follows_next_cursor() {
        let mut mock = connected_mock();
        mock.expect_request()
            .withf(|method, params| method == "tools/list" && params.is_none())
            .times(1)
            .returning(|_, _| Ok(json!({"tools": [{"name": "a"}], "nextCursor": "p2"})));
        mock.expect_request()
            .withf(|method, params| {
                method == "tools/list" && params.as_ref() == Some(&json!({"cursor": "p2"}))
            })
            .times(1)
            .returning(|_, _| Ok(json!({"tools": [{"name": "b"}]})));
        let handle = handle_with(mock);

        let listing = list_server_tools(Some(&handle), "files").await;
        let names: Vec<_> = listing.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_connection_timeout_passed_through() {
        let mut mock = connected_mock();
        mock.expect_request()
            .returning(|_, _| Err(Error::timeout("Connection timeout after 5s")));
        let handle = handle_with(mock);

        let listing = list_server_tools(Some(&handle), "files").await;
        assert!(listing.tools.is_empty());
        assert_eq!(listing.error.as_deref(), Some("Connection timeout after 5s"));
    }

    #[tokio::test]
    async fn test_other_failures_are_wrapped() {
        let mut mock = connected_mock();
        mock.expect_request()
            .returning(|_, _| Err(Error::rpc(-32601, "Method not found")));
        let handle = handle_with(mock);

        let listing = list_server_tools(Some(&handle), "files").await;
        assert_eq!(
            listing.error.as_deref(),
            Some("Failed to list tools: Method not found")
        );
    }

    #[test]
    fn test_listing_serializes_without_null_error() {
        let listing = ToolListing::default();
        assert_eq!(serde_json::to_value(&listing).unwrap(), json!({"tools": []}));
    }
}

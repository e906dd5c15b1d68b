//! Transport seam and the borrowed server handle.
//!
//! The client never opens or closes connections. Callers hand it a
//! [`ServerHandle`] wrapping whatever [`Transport`] they already hold.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::types::Result;

/// Sends JSON-RPC messages to one remote tool server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for its `result`.
    ///
    /// A JSON-RPC error object comes back as [`Error::Rpc`](crate::Error::Rpc).
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value>;

    /// Send a one-way notification.
    async fn notify(&self, method: &str, params: Option<Value>) -> Result<()>;

    /// Whether the underlying connection is still usable.
    fn is_connected(&self) -> bool {
        true
    }
}

/// Externally-owned connection to a tool server.
#[derive(Clone)]
pub struct ServerHandle {
    name: String,
    transport: Option<Arc<dyn Transport>>,
}

impl ServerHandle {
    pub fn connected(name: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            name: name.into(),
            transport: Some(transport),
        }
    }

    /// A handle with no send capability.
    pub fn detached(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.transport.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.transport
            .as_ref()
            .map(|t| t.is_connected())
            .unwrap_or(false)
    }
}

impl fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerHandle")
            .field("name", &self.name)
            .field("has_transport", &self.transport.is_some())
            .finish()
    }
}

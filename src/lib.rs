//! # Toolbridge - MCP tool-invocation client
//!
//! Client side of the Model Context Protocol tool surface:
//! - Tool discovery (`tools/list`) that never fails, only reports
//! - Argument normalization for missing values before a call is sent
//! - Deadline-bounded tool calls with a single, well-formed outcome
//! - Best-effort `notifications/cancelled` for abandoned calls
//! - Classification of failures into a stable status-code taxonomy
//!
//! ## Architecture
//!
//! ```text
//!                   ┌──────────────────────────────────────┐
//!   call_tool  ───► │            ToolDispatcher            │
//!                   │  ┌───────────┐ ┌────────┐ ┌────────┐ │
//!                   │  │ normalize │ │deadline│ │classify│ │
//!                   │  └───────────┘ └────────┘ └────────┘ │
//!                   └──────────────────┬───────────────────┘
//!                                      │ Arc<dyn Transport>
//!                           ┌──────────▼──────────┐
//!                           │ ServerHandle (HTTP) │
//!                           └─────────────────────┘
//! ```
//!
//! Connection management lives outside this crate. Callers hand the
//! dispatcher a borrowed [`ServerHandle`] per call.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod dispatch;
pub mod protocol;
pub mod tools;
pub mod transport;
pub mod types;

// Internal utilities
pub mod observability;

pub use dispatch::{CallFailure, CallOutcome, CallResult, ErrorKind, ToolDispatcher};
pub use tools::{ToolDescriptor, ToolListing};
pub use transport::{HttpTransport, ServerHandle, Transport};
pub use types::{Config, Error, ProgressToken, Result};

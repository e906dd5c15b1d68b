//! Core types for the tool client.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Strongly-typed identifiers (ProgressToken, SessionId)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for dispatch, transport and logging

mod config;
mod errors;
mod ids;

pub use config::{
    Config, DispatchConfig, HttpConfig, ObservabilityConfig, ENV_AUTH_TOKEN, ENV_LOG_FORMAT,
};
pub use errors::{Error, Result};
pub use ids::{ProgressToken, SessionId};

//! Call dispatcher: one tool call in, exactly one [`CallResult`] out.
//!
//! Each call owns its envelope, correlation token and timer. The remote call
//! runs as its own task; with a deadline it is raced against a timer and the
//! first to settle decides the outcome. When the timer wins the in-flight
//! request is cancelled locally, the task is detached, and the server gets a
//! best-effort `notifications/cancelled` carrying the same token the caller
//! receives in the timeout failure. That notice is sent from its own task;
//! the timeout is returned without waiting for it.
//!
//! ```text
//!   call_tool ─► normalize ─► envelope(token) ─► spawn(tools/call)
//!                                                   │
//!                      no deadline / infinite ──────┤ await
//!                      deadline D ──── race(call, sleep D)
//!                                         │           │
//!                                   call settles   timer fires
//!                                         │           ├─ cancel local task
//!                                         │           ├─ notifications/cancelled(token)
//!                                         ▼           ▼
//!                                Success / classify   Failure 408 (token)
//! ```

pub mod cancel;
pub mod classify;
pub mod deadline;
pub mod events;
pub mod result;

pub use cancel::cancel_tool_execution;
pub use classify::{classify, Classification, ClassificationRule, RawError, CLASSIFICATION_ORDER};
pub use deadline::{Deadline, INFINITE_TIMEOUT_SECONDS};
pub use events::{CallEvent, CallLog, EventLevel};
pub use result::{content_text, CallFailure, CallResult, ErrorKind, ToolCallResponse};

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::protocol::{methods, CallMeta, CallToolParams};
use crate::tools::catalog::{self, ToolListing};
use crate::tools::normalize::{normalize_arguments, ArgumentMap, DefaultStrategy, NameConventionDefaults};
use crate::tools::schema::validate_arguments;
use crate::transport::{ServerHandle, Transport};
use crate::types::{DispatchConfig, Error, ProgressToken, Result};

/// One call attempt. Never reused.
#[derive(Debug, Clone, PartialEq)]
pub struct CallEnvelope {
    pub tool_name: String,
    pub arguments: ArgumentMap,
    pub correlation_token: ProgressToken,
}

impl CallEnvelope {
    /// Wrap already-normalized arguments with a fresh correlation token.
    pub fn new(tool_name: impl Into<String>, arguments: ArgumentMap) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
            correlation_token: ProgressToken::new(),
        }
    }

    pub fn to_params(&self) -> CallToolParams {
        CallToolParams {
            name: self.tool_name.clone(),
            arguments: self.arguments.clone(),
            meta: CallMeta {
                progress_token: self.correlation_token.clone(),
            },
        }
    }
}

/// Result of a call plus what happened along the way.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub result: CallResult,
    pub log: CallLog,
}

/// Entry point for tool discovery, calls and cancellation.
pub struct ToolDispatcher {
    strategy: Arc<dyn DefaultStrategy>,
    config: DispatchConfig,
}

impl ToolDispatcher {
    pub fn new() -> Self {
        Self::with_config(DispatchConfig::default())
    }

    pub fn with_config(config: DispatchConfig) -> Self {
        Self {
            strategy: Arc::new(NameConventionDefaults),
            config,
        }
    }

    /// Replace the default-inference strategy used by the normalizer.
    pub fn with_strategy(mut self, strategy: Arc<dyn DefaultStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Call `tool_name` on `handle`.
    ///
    /// `timeout_seconds`: `None` waits indefinitely, `Some(-1.0)` waits
    /// indefinitely by explicit request, a positive value bounds the call.
    pub async fn call_tool(
        &self,
        handle: Option<&ServerHandle>,
        server_name: &str,
        tool_name: &str,
        arguments: &ArgumentMap,
        timeout_seconds: Option<f64>,
    ) -> CallOutcome {
        let mut log = CallLog::new();
        let result = self
            .run(handle, server_name, tool_name, arguments, timeout_seconds, None, &mut log)
            .await;
        CallOutcome { result, log }
    }

    /// Like [`call_tool`](Self::call_tool), but first validates the
    /// normalized arguments against `input_schema`. Violations fail with
    /// 400 before anything is sent.
    pub async fn call_tool_checked(
        &self,
        handle: Option<&ServerHandle>,
        server_name: &str,
        tool_name: &str,
        arguments: &ArgumentMap,
        timeout_seconds: Option<f64>,
        input_schema: &Value,
    ) -> CallOutcome {
        let mut log = CallLog::new();
        let result = self
            .run(
                handle,
                server_name,
                tool_name,
                arguments,
                timeout_seconds,
                Some(input_schema),
                &mut log,
            )
            .await;
        CallOutcome { result, log }
    }

    pub async fn list_server_tools(
        &self,
        handle: Option<&ServerHandle>,
        server_name: &str,
    ) -> ToolListing {
        catalog::list_server_tools(handle, server_name).await
    }

    pub async fn cancel_tool_execution(
        &self,
        handle: &ServerHandle,
        token: &ProgressToken,
        reason: &str,
    ) -> Result<()> {
        cancel_tool_execution(handle, token, reason).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn run(
        &self,
        handle: Option<&ServerHandle>,
        server_name: &str,
        tool_name: &str,
        arguments: &ArgumentMap,
        timeout_seconds: Option<f64>,
        input_schema: Option<&Value>,
        log: &mut CallLog,
    ) -> CallResult {
        let Some(handle) = handle else {
            log.warn(format!("server '{}' not found", server_name));
            return CallFailure::new(ErrorKind::NotConnected, 404, "Server not found").into();
        };
        let Some(transport) = handle.transport() else {
            log.warn(format!("server '{}' has no transport", server_name));
            return CallFailure::new(
                ErrorKind::NotConnected,
                404,
                format!("Server '{}' is not connected", server_name),
            )
            .into();
        };

        let deadline = Deadline::from_timeout_seconds(timeout_seconds).unwrap_or_else(|e| {
            log.warn(format!("{}; waiting without a timeout", e));
            Deadline::Unspecified
        });

        let envelope = CallEnvelope::new(
            tool_name,
            normalize_arguments(arguments, self.strategy.as_ref()),
        );

        if let Some(schema) = input_schema {
            let violations = validate_arguments(schema, &envelope.arguments);
            if !violations.is_empty() {
                log.warn(format!(
                    "arguments for '{}' rejected by input schema ({} violation(s))",
                    tool_name,
                    violations.len()
                ));
                return CallFailure::new(
                    ErrorKind::InvalidArguments,
                    400,
                    format!(
                        "Invalid arguments for tool '{}': {}",
                        tool_name,
                        violations.join("; ")
                    ),
                )
                .with_token(envelope.correlation_token)
                .into();
            }
        }

        let params = match serde_json::to_value(envelope.to_params()) {
            Ok(p) => p,
            Err(e) => return self.failed(&e.into(), envelope.correlation_token, log),
        };
        let token = envelope.correlation_token;
        log.debug(format!(
            "calling '{}' on '{}' (progress token {})",
            tool_name, server_name, token
        ));

        let cancel = CancellationToken::new();
        // Abandon the remote call if this future is dropped mid-flight.
        let _abandon_on_drop = cancel.clone().drop_guard();
        let mut call = tokio::spawn(invoke(transport, params, cancel.clone()));

        let settled = match deadline {
            Deadline::Unspecified => {
                log.debug("no timeout requested; waiting for the call to settle");
                (&mut call).await
            }
            Deadline::Infinite => {
                log.info("infinite timeout requested; waiting for the call to settle");
                (&mut call).await
            }
            Deadline::After(limit) => {
                log.debug(format!("timeout armed for {}s", limit.as_secs_f64()));
                match tokio::time::timeout(limit, &mut call).await {
                    Ok(settled) => settled,
                    Err(_) => {
                        cancel.cancel();
                        return self.abandon(handle, tool_name, token, limit, log);
                    }
                }
            }
        };

        match settled {
            Ok(Ok(payload)) => {
                log.debug(format!("'{}' settled successfully", tool_name));
                CallResult::Success {
                    payload,
                    correlation_token: token,
                }
            }
            Ok(Err(e)) => self.failed(&e, token, log),
            Err(join) => self.failed(
                &Error::internal(format!("tool call task failed: {}", join)),
                token,
                log,
            ),
        }
    }

    /// Timer won the race. The local task is already cancelled. The server
    /// is notified from a detached task and the timeout is reported at once.
    fn abandon(
        &self,
        handle: &ServerHandle,
        tool_name: &str,
        token: ProgressToken,
        limit: Duration,
        log: &mut CallLog,
    ) -> CallResult {
        let seconds = limit.as_secs_f64();
        log.warn(format!(
            "'{}' exceeded its {}s deadline; abandoning call {}",
            tool_name, seconds, token
        ));

        let reason = self.config.cancel_reason_for(seconds);
        let grace = self.config.cancel_grace;
        let handle = handle.clone();
        let notice = token.clone();
        tokio::spawn(
            async move {
                let send = cancel_tool_execution(&handle, &notice, &reason);
                match tokio::time::timeout(grace, send).await {
                    Ok(Ok(())) => tracing::debug!(
                        server = handle.name(),
                        token = %notice,
                        "sent cancellation notification"
                    ),
                    Ok(Err(e)) => tracing::warn!(
                        server = handle.name(),
                        token = %notice,
                        error = %e,
                        "failed to send cancellation notification"
                    ),
                    Err(_) => tracing::warn!(
                        server = handle.name(),
                        token = %notice,
                        ?grace,
                        "cancellation notification still pending; dropped"
                    ),
                }
            }
            .in_current_span(),
        );
        log.info(format!("cancellation requested for {}", token));

        CallFailure::timed_out(seconds, token).into()
    }

    fn failed(&self, err: &Error, token: ProgressToken, log: &mut CallLog) -> CallResult {
        let verdict = classify(&RawError::from(err), self.config.default_status_code);
        log.warn(format!(
            "call failed with status {}: {}",
            verdict.status_code, err
        ));
        verdict.into_failure().with_token(token).into()
    }
}

impl Default for ToolDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ToolDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// The remote half of the race. Ends early once `cancel` fires so the
/// in-flight request is dropped instead of lingering.
async fn invoke(
    transport: Arc<dyn Transport>,
    params: Value,
    cancel: CancellationToken,
) -> Result<Value> {
    tokio::select! {
        _ = cancel.cancelled() => Err(Error::cancelled("tool call abandoned")),
        result = transport.request(methods::TOOLS_CALL, Some(params)) => result,
    }
}

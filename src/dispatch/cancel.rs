//! Cancellation notifier: tell a server to abandon an in-flight call.
//!
//! The protocol defines no reply to `notifications/cancelled`; success here
//! only means the notification was handed to the transport.

use crate::protocol::{methods, CancelledParams};
use crate::transport::ServerHandle;
use crate::types::{Error, ProgressToken, Result};

/// Send `notifications/cancelled` for `token` with a human-readable reason.
pub async fn cancel_tool_execution(
    handle: &ServerHandle,
    token: &ProgressToken,
    reason: &str,
) -> Result<()> {
    let transport = handle
        .transport()
        .ok_or_else(|| Error::transport_unavailable(handle.name()))?;

    let params = serde_json::to_value(CancelledParams {
        request_id: token.clone(),
        reason: reason.to_string(),
    })?;

    transport.notify(methods::CANCELLED, Some(params)).await
}

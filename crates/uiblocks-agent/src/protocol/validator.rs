//! Inbound invocation validation.

use serde_json::Value;

use uiblocks_proto::types::{ErrorCode, ToolInvocation, UiEvent};

/// Validate `tool.invoke` arguments into a typed invocation.
///
/// On failure, returns the ready-to-send `INVALID_ARGS` terminal event,
/// addressed with whatever `callId` the raw args carried (empty string when
/// absent), so the dispatcher's response path stays uniform. No call record
/// is created for an invalid invocation.
pub fn validate_invocation(args: &Value) -> Result<ToolInvocation, UiEvent> {
    ToolInvocation::parse(args).map_err(|err| {
        UiEvent::tool_error(&err.call_id, ErrorCode::InvalidArgs, &err.message, false)
    })
}

//! Typed boundary for inbound `tool.invoke` and `tool.cancel` arguments.

use serde_json::{json, Value};

/// A validated tool invocation request.
///
/// Parsed out of `tool.invoke.args` immediately after decode; everything past
/// this boundary works with owned, non-empty strings. The `arguments` value
/// stays opaque for the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// Caller-assigned call identifier, unique while in flight.
    pub call_id: String,
    /// Identifier of the content announcement that offered the tool.
    pub request_id: String,
    /// Identifier of the message the invocation originates from.
    pub message_id: String,
    /// Block within the originating message, when the client reported one.
    pub origin_block_id: Option<String>,
    /// Name of the tool to run.
    pub tool_name: String,
    /// Opaque tool arguments.
    pub arguments: Value,
}

/// A `tool.invoke` that failed validation.
///
/// Carries whatever `callId` string was present (empty when absent) so the
/// terminal error response can still be correlated by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidInvocation {
    /// The callId from the raw args, or empty.
    pub call_id: String,
    /// What was missing.
    pub message: String,
}

impl ToolInvocation {
    /// Parse and validate `tool.invoke` arguments.
    ///
    /// All of `callId`, `requestId`, `messageId` and `tool.name` must be
    /// present, non-empty strings; anything else is a terminal protocol
    /// error, not a retryable condition.
    pub fn parse(args: &Value) -> Result<Self, InvalidInvocation> {
        let call_id = non_empty_str(args.get("callId"));
        let request_id = non_empty_str(args.get("requestId"));
        let message_id = non_empty_str(args.get("messageId"));
        let tool_name = non_empty_str(args.get("tool").and_then(|t| t.get("name")));

        if call_id.is_none() || request_id.is_none() || message_id.is_none() || tool_name.is_none()
        {
            return Err(InvalidInvocation {
                call_id: call_id.unwrap_or_default(),
                message: "missing callId/requestId/messageId/tool.name".to_string(),
            });
        }

        Ok(Self {
            call_id: call_id.unwrap_or_default(),
            request_id: request_id.unwrap_or_default(),
            message_id: message_id.unwrap_or_default(),
            origin_block_id: args
                .get("origin")
                .and_then(|o| o.get("blockId"))
                .and_then(Value::as_str)
                .map(str::to_string),
            tool_name: tool_name.unwrap_or_default(),
            arguments: match args.get("arguments") {
                Some(v) if !v.is_null() => v.clone(),
                _ => json!({}),
            },
        })
    }
}

/// Parsed `tool.cancel` arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CancelRequest {
    /// Target call id; empty when absent. Non-string ids are stringified so
    /// the caller still receives a correlated terminal response.
    pub call_id: String,
    /// Optional caller-supplied reason.
    pub reason: Option<String>,
}

impl CancelRequest {
    /// Parse `tool.cancel` arguments. Never fails; a cancel with no usable
    /// target still deserves a terminal response.
    pub fn parse(args: &Value) -> Self {
        let call_id = match args.get("callId") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        Self {
            call_id,
            reason: args
                .get("reason")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

//! Terminal outcome types for tool calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::event::UiEvent;

/// Error codes emitted on the events topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The invocation was malformed, or its call id collided with a live call.
    #[serde(rename = "INVALID_ARGS")]
    InvalidArgs,
    /// The call terminated because cancellation was requested.
    #[serde(rename = "CANCELLED")]
    Cancelled,
    /// The executor faulted.
    #[serde(rename = "INTERNAL")]
    Internal,
}

impl ErrorCode {
    /// The wire spelling of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgs => "INVALID_ARGS",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Success payload produced by a tool executor.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Structured result handed back to the caller.
    pub output: Value,
    /// Optional content-announcement-shaped payload, opaque to the core.
    pub ui: Option<Value>,
}

/// The single terminal outcome of a tool call.
///
/// Exactly one of these is produced per registered call, whichever path the
/// execution takes.
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    /// Normal completion.
    Success(ToolOutput),
    /// The cancellation signal was honored before completion.
    Cancelled {
        /// Reason to report to the caller, when one is known.
        reason: Option<String>,
    },
    /// The executor raised a fault.
    Failed {
        /// Fault description.
        message: String,
    },
}

impl ToolOutcome {
    /// Convert this outcome into the terminal event for `call_id`.
    pub fn into_event(self, call_id: &str) -> UiEvent {
        match self {
            ToolOutcome::Success(out) => UiEvent::final_result(call_id, out.output, out.ui),
            ToolOutcome::Cancelled { reason } => UiEvent::tool_error(
                call_id,
                ErrorCode::Cancelled,
                reason.as_deref().unwrap_or("cancelled"),
                false,
            ),
            ToolOutcome::Failed { message } => {
                UiEvent::tool_error(call_id, ErrorCode::Internal, &message, false)
            }
        }
    }
}

//! Interaction event types carried on the events topic.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::outcome::ErrorCode;

/// Inbound event: a remote participant asks to run a tool.
pub const EVENT_TOOL_INVOKE: &str = "tool.invoke";
/// Inbound event: a remote participant asks to cancel an in-flight call.
pub const EVENT_TOOL_CANCEL: &str = "tool.cancel";
/// Inbound observability event: the client rendered a content payload.
pub const EVENT_UI_RENDERED: &str = "ui.rendered";
/// Inbound observability event: the client failed to render a payload.
pub const EVENT_UI_ERROR: &str = "ui.error";
/// Outbound event: progress or final result for a call.
pub const EVENT_TOOL_RESULT: &str = "tool.result";
/// Outbound event: terminal error for a call.
pub const EVENT_TOOL_ERROR: &str = "tool.error";

/// A single interaction event, `{name, args}`.
///
/// Unknown names are expected on the wire; the protocol is forward
/// compatible, so both fields default rather than failing the parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiEvent {
    /// Event name (e.g. "tool.invoke").
    #[serde(default)]
    pub name: String,
    /// Event arguments; shape depends on the name.
    #[serde(default)]
    pub args: Value,
}

/// Arguments of an outbound `tool.result` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultArgs {
    /// The call this result belongs to.
    pub call_id: String,
    /// False for progress notifications, true exactly once per call.
    #[serde(rename = "final")]
    pub is_final: bool,
    /// Progress in `[0, 1]`; present on progress notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Optional display content accompanying a progress notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    /// Tool output; present on the final notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Opaque content-announcement-shaped payload; never validated here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<Value>,
}

/// Arguments of an outbound `tool.error` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolErrorArgs {
    /// The call this error terminates.
    pub call_id: String,
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Whether the caller may retry the invocation.
    pub retriable: bool,
}

impl UiEvent {
    /// Build an event from a name and raw arguments.
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Build a non-final `tool.result` progress event.
    pub fn progress(call_id: &str, progress: f64, content: Option<Value>) -> Self {
        let args = ToolResultArgs {
            call_id: call_id.to_string(),
            is_final: false,
            progress: Some(progress),
            content,
            output: None,
            ui: None,
        };
        Self::new(EVENT_TOOL_RESULT, to_args(&args))
    }

    /// Build the final `tool.result` success event.
    pub fn final_result(call_id: &str, output: Value, ui: Option<Value>) -> Self {
        let args = ToolResultArgs {
            call_id: call_id.to_string(),
            is_final: true,
            progress: None,
            content: None,
            output: Some(output),
            ui,
        };
        Self::new(EVENT_TOOL_RESULT, to_args(&args))
    }

    /// Build a terminal `tool.error` event.
    pub fn tool_error(call_id: &str, code: ErrorCode, message: &str, retriable: bool) -> Self {
        let args = ToolErrorArgs {
            call_id: call_id.to_string(),
            code,
            message: message.to_string(),
            retriable,
        };
        Self::new(EVENT_TOOL_ERROR, to_args(&args))
    }

    /// Whether this event is a terminal notification (final result or error).
    pub fn is_terminal(&self) -> bool {
        match self.name.as_str() {
            EVENT_TOOL_ERROR => true,
            EVENT_TOOL_RESULT => self.args.get("final").and_then(Value::as_bool) == Some(true),
            _ => false,
        }
    }
}

fn to_args(args: &impl Serialize) -> Value {
    // The outbound arg structs serialize infallibly.
    serde_json::to_value(args).unwrap_or(Value::Null)
}

//! Tool executors: the pluggable units of work behind `tool.invoke`.
//!
//! A tool emits any number of progress notifications through its context and
//! returns one output. The harness around it guarantees the protocol's
//! exactly-once terminal notification and unconditional registry cleanup.

pub mod calculate_loan;
pub mod echo;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use uiblocks_proto::types::{ToolInvocation, ToolOutcome, ToolOutput, UiEvent};

use crate::calls::CallRegistry;
use crate::outbound::OutboundSender;
use crate::types::AgentResult;

/// Client-facing description of a tool, embedded in content announcements
/// and printed by the `info` command.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Wire name (unique).
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the invocation arguments.
    #[serde(rename = "argumentsSchema", skip_serializing_if = "Option::is_none")]
    pub arguments_schema: Option<Value>,
    /// JSON Schema for the success output.
    #[serde(rename = "resultSchema", skip_serializing_if = "Option::is_none")]
    pub result_schema: Option<Value>,
}

/// Execution context handed to a tool.
pub struct ToolContext {
    /// The validated invocation being served.
    pub invocation: ToolInvocation,
    cancel: CancellationToken,
    sender: OutboundSender,
    destination: Option<String>,
}

impl ToolContext {
    /// Emit a progress notification for this call. Notifications reach the
    /// transport in emission order relative to this call's terminal event.
    pub async fn progress(&self, progress: f64, content: Option<Value>) -> AgentResult<()> {
        let event = UiEvent::progress(&self.invocation.call_id, progress, content);
        self.sender
            .send_event(&event, self.destination.as_deref(), None)
            .await
    }

    /// The cancellation token for this call. Explicit waits inside a tool
    /// are cancellation checkpoints; the harness observes the token at every
    /// await point of the tool future.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// A named unit of work invocable over the events topic.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Wire name of this tool.
    fn name(&self) -> &'static str;

    /// Client-facing definition.
    fn definition(&self) -> ToolDefinition;

    /// Run the tool. Progress goes through the context; the returned output
    /// becomes the final notification. Errors become a terminal `INTERNAL`.
    async fn run(&self, ctx: &ToolContext) -> AgentResult<ToolOutput>;
}

/// Registry of named tools with a fallback executor.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    fallback: Arc<dyn Tool>,
}

impl ToolRegistry {
    /// Build the default registry: the loan quote tool plus the echo
    /// reference tool, which doubles as the fallback.
    pub fn with_defaults(delay: Duration) -> Self {
        let fallback: Arc<dyn Tool> = Arc::new(echo::EchoTool::new(delay));
        let mut registry = Self {
            tools: HashMap::new(),
            fallback: Arc::clone(&fallback),
        };
        registry.register(fallback);
        registry.register(Arc::new(calculate_loan::CalculateLoanTool::new(delay)));
        registry
    }

    /// Register a tool under its wire name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Resolve a tool by name. Unregistered names run the fallback, keeping
    /// invocation name-agnostic for clients that offer their own tool lists.
    pub fn resolve(&self, name: &str) -> Arc<dyn Tool> {
        match self.tools.get(name) {
            Some(tool) => Arc::clone(tool),
            None => {
                tracing::debug!(name, "unregistered tool, using fallback");
                Arc::clone(&self.fallback)
            }
        }
    }

    /// Definitions of all registered tools.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> =
            self.tools.values().map(|tool| tool.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }
}

/// Run one validated invocation to its terminal notification.
///
/// Exactly one terminal event is sent per call: the tool's success output, a
/// `CANCELLED` error when the token fires first, or an `INTERNAL` error when
/// the tool faults. The registry record is removed last, unconditionally,
/// even when the terminal send itself fails.
pub async fn run_invocation(
    registry: Arc<CallRegistry>,
    tools: Arc<ToolRegistry>,
    sender: OutboundSender,
    invocation: ToolInvocation,
    destination: Option<String>,
    cancel: CancellationToken,
) {
    let call_id = invocation.call_id.clone();
    let tool_name = invocation.tool_name.clone();
    let tool = tools.resolve(&tool_name);

    let ctx = ToolContext {
        invocation,
        cancel: cancel.clone(),
        sender: sender.clone(),
        destination: destination.clone(),
    };

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::info!(%call_id, tool = %tool_name, "call cancelled");
            ToolOutcome::Cancelled { reason: None }
        }
        result = tool.run(&ctx) => match result {
            Ok(output) => ToolOutcome::Success(output),
            Err(e) => {
                tracing::warn!(%call_id, tool = %tool_name, "tool failed: {e}");
                ToolOutcome::Failed {
                    message: e.to_string(),
                }
            }
        },
    };

    let terminal = outcome.into_event(&call_id);
    if let Err(e) = sender
        .send_event(&terminal, destination.as_deref(), None)
        .await
    {
        tracing::warn!(%call_id, "terminal send failed: {e}");
    }

    // Unconditional: a failed send must never leak the record, which would
    // permanently block this call id.
    registry.remove(&call_id).await;
}

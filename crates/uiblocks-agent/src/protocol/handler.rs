//! The protocol state machine: routes inbound interaction events.
//!
//! Per call id the states are Idle (no record), Invoked (record present),
//! CancelRequested (record present, token fired) and terminal (record absent
//! again). Every transition goes through the call registry's single lock.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use uiblocks_proto::codec::decode_event;
use uiblocks_proto::types::{
    CancelRequest, ErrorCode, UiEvent, EVENT_TOOL_CANCEL, EVENT_TOOL_INVOKE, EVENT_UI_ERROR,
    EVENT_UI_RENDERED,
};

use super::validator::validate_invocation;
use crate::calls::{CallRegistry, RegisterOutcome};
use crate::outbound::OutboundSender;
use crate::tools::{self, ToolRegistry};

/// Optional hardening bounds. Both off by default, matching the reference
/// behavior of unbounded, untimed calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallLimits {
    /// Upper bound on concurrently running calls.
    pub max_inflight_calls: Option<usize>,
    /// Per-call deadline; an expired call terminates through its own
    /// cancellation path.
    pub call_timeout: Option<Duration>,
}

/// Routes inbound events to registration, cancellation, or logging.
pub struct EventDispatcher {
    registry: Arc<CallRegistry>,
    tools: Arc<ToolRegistry>,
    sender: OutboundSender,
    limits: CallLimits,
}

impl EventDispatcher {
    /// Create a dispatcher with no hardening limits.
    pub fn new(
        registry: Arc<CallRegistry>,
        tools: Arc<ToolRegistry>,
        sender: OutboundSender,
    ) -> Self {
        Self {
            registry,
            tools,
            sender,
            limits: CallLimits::default(),
        }
    }

    /// Apply hardening limits.
    pub fn with_limits(mut self, limits: CallLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The shared call registry.
    pub fn registry(&self) -> &Arc<CallRegistry> {
        &self.registry
    }

    /// Decode and route one inbound text message from `participant`.
    ///
    /// Malformed JSON is logged and dropped: no reliable `callId` can be
    /// recovered, so no response is addressed.
    pub async fn handle_text(&self, text: &str, participant: &str) {
        match decode_event(text) {
            Ok(event) => self.handle_event(event, participant).await,
            Err(e) => {
                tracing::warn!(from = participant, "dropping malformed event: {e}");
            }
        }
    }

    /// Route one decoded event.
    pub async fn handle_event(&self, event: UiEvent, participant: &str) {
        match event.name.as_str() {
            EVENT_TOOL_INVOKE => self.handle_invoke(&event.args, participant).await,
            EVENT_TOOL_CANCEL => self.handle_cancel(&event.args, participant).await,
            EVENT_UI_RENDERED | EVENT_UI_ERROR => {
                tracing::info!(from = participant, name = %event.name, args = %event.args, "observability event");
            }
            // Forward compatible: unknown names are ignored, not answered.
            other => {
                tracing::debug!(from = participant, name = other, "ignoring unknown event");
            }
        }
    }

    async fn handle_invoke(&self, args: &Value, participant: &str) {
        let invocation = match validate_invocation(args) {
            Ok(invocation) => invocation,
            Err(error_event) => {
                tracing::warn!(from = participant, "tool.invoke missing required fields");
                self.send_to(error_event, participant).await;
                return;
            }
        };

        let call_id = invocation.call_id.clone();
        let cancel = CancellationToken::new();
        match self
            .registry
            .register(&call_id, cancel.clone(), self.limits.max_inflight_calls)
            .await
        {
            RegisterOutcome::Registered => {}
            RegisterOutcome::DuplicateId => {
                // Caller bug: the id still names a live call. The running
                // call is left untouched.
                tracing::warn!(%call_id, from = participant, "duplicate callId for live call");
                let event = UiEvent::tool_error(
                    &call_id,
                    ErrorCode::InvalidArgs,
                    "callId already in flight",
                    false,
                );
                self.send_to(event, participant).await;
                return;
            }
            RegisterOutcome::AtCapacity => {
                tracing::warn!(%call_id, from = participant, "refusing invoke: in-flight bound reached");
                let event = UiEvent::tool_error(
                    &call_id,
                    ErrorCode::Internal,
                    "too many calls in flight",
                    true,
                );
                self.send_to(event, participant).await;
                return;
            }
        }

        tracing::info!(%call_id, tool = %invocation.tool_name, from = participant, "tool invoked");

        if let Some(timeout) = self.limits.call_timeout {
            spawn_deadline(cancel.clone(), timeout);
        }

        let handle = tokio::spawn(tools::run_invocation(
            Arc::clone(&self.registry),
            Arc::clone(&self.tools),
            self.sender.clone(),
            invocation,
            Some(participant.to_string()),
            cancel,
        ));
        self.registry.attach(&call_id, handle).await;
    }

    async fn handle_cancel(&self, args: &Value, participant: &str) {
        let request = CancelRequest::parse(args);

        if self
            .registry
            .cancel(&request.call_id, request.reason.as_deref())
            .await
        {
            // The running task observes the token and emits the terminal
            // CANCELLED itself; nothing to synthesize here.
            tracing::info!(call_id = %request.call_id, from = participant, "cancellation requested");
            return;
        }

        // Unknown, malformed, or already-finished target: the canceller
        // still gets a terminal signal, so tool.cancel is always answered.
        let message = request.reason.as_deref().unwrap_or("cancelled");
        let event = UiEvent::tool_error(&request.call_id, ErrorCode::Cancelled, message, false);
        self.send_to(event, participant).await;
    }

    async fn send_to(&self, event: UiEvent, participant: &str) {
        if let Err(e) = self.sender.send_event(&event, Some(participant), None).await {
            tracing::warn!(name = %event.name, to = participant, "send failed: {e}");
        }
    }
}

fn spawn_deadline(cancel: CancellationToken, timeout: Duration) {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(timeout) => {
                // Firing after the call finished is harmless; the token is
                // dead once the record is gone.
                cancel.cancel();
            }
        }
    });
}

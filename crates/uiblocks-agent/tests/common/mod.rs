//! Shared fixtures for dispatcher tests.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

use uiblocks_agent::protocol::CallLimits;
use uiblocks_agent::transport::{ChannelTransport, SentMessage};
use uiblocks_agent::{CallRegistry, EventDispatcher, OutboundSender, ToolRegistry};
use uiblocks_proto::codec::TOPIC_UI_EVENTS;

/// Build a dispatcher over a channel transport with the given tool delay.
pub fn create_dispatcher(
    delay_ms: u64,
    limits: CallLimits,
) -> (Arc<EventDispatcher>, UnboundedReceiver<SentMessage>) {
    let (transport, rx) = ChannelTransport::new();
    let sender = OutboundSender::new(transport);
    let registry = Arc::new(CallRegistry::new());
    let tools = Arc::new(ToolRegistry::with_defaults(Duration::from_millis(delay_ms)));
    let dispatcher = Arc::new(
        EventDispatcher::new(registry, tools, sender).with_limits(limits),
    );
    (dispatcher, rx)
}

/// Receive the next outbound event, asserting it is on the events topic.
pub async fn next_event(rx: &mut UnboundedReceiver<SentMessage>) -> Value {
    let msg = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for outbound event")
        .expect("transport channel closed");
    assert_eq!(msg.topic, TOPIC_UI_EVENTS);
    msg.json()
}

/// Assert that no outbound message arrives within a short window.
pub async fn assert_silent(rx: &mut UnboundedReceiver<SentMessage>) {
    let result = timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(result.is_err(), "expected silence, got {:?}", result);
}

/// Well-formed tool.invoke args for the given call id.
pub fn invoke_args(call_id: &str, tool: &str, arguments: Value) -> Value {
    json!({
        "callId": call_id,
        "requestId": format!("req.{call_id}"),
        "messageId": format!("msg.{call_id}"),
        "tool": {"name": tool},
        "arguments": arguments,
    })
}

/// Wait for the registry to drop the given call record.
pub async fn wait_until_removed(dispatcher: &EventDispatcher, call_id: &str) {
    for _ in 0..100 {
        if !dispatcher.registry().contains(call_id).await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("call {call_id} was never removed from the registry");
}

//! Stress tests: many calls, sustained throughput, wall-clock bounds.
//!
//! Tests verify that the dispatcher handles dozens of concurrent calls
//! without losing terminals, and that concurrency actually overlaps the
//! simulated tool delays instead of serializing them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

use uiblocks_agent::transport::{ChannelTransport, SentMessage};
use uiblocks_agent::{CallRegistry, EventDispatcher, OutboundSender, ToolRegistry};
use uiblocks_proto::types::UiEvent;

// ─── Helpers ───────────────────────────────────────────────────────────────

fn create_dispatcher(
    delay_ms: u64,
) -> (Arc<EventDispatcher>, UnboundedReceiver<SentMessage>) {
    let (transport, rx) = ChannelTransport::new();
    let sender = OutboundSender::new(transport);
    let registry = Arc::new(CallRegistry::new());
    let tools = Arc::new(ToolRegistry::with_defaults(Duration::from_millis(delay_ms)));
    let dispatcher = Arc::new(EventDispatcher::new(registry, tools, sender));
    (dispatcher, rx)
}

fn invoke(call_id: &str) -> UiEvent {
    UiEvent::new(
        "tool.invoke",
        json!({
            "callId": call_id,
            "requestId": format!("req.{call_id}"),
            "messageId": format!("msg.{call_id}"),
            "tool": {"name": "echo"},
            "arguments": {"id": call_id},
        }),
    )
}

fn is_terminal(event: &Value) -> bool {
    match event["name"].as_str() {
        Some("tool.error") => true,
        Some("tool.result") => event["args"]["final"] == true,
        _ => false,
    }
}

/// Drain events until `expected` terminals have arrived; returns them.
async fn drain_terminals(
    rx: &mut UnboundedReceiver<SentMessage>,
    expected: usize,
) -> Vec<Value> {
    let mut terminals = Vec::new();
    while terminals.len() < expected {
        let msg = timeout(Duration::from_secs(30), rx.recv())
            .await
            .expect("timed out waiting for terminals")
            .expect("transport channel closed");
        let event = msg.json();
        if is_terminal(&event) {
            terminals.push(event);
        }
    }
    terminals
}

// ─── Tests ─────────────────────────────────────────────────────────────────

/// 100 sequential calls all complete and leave the registry empty.
#[tokio::test]
async fn test_sequential_calls() {
    let (dispatcher, mut rx) = create_dispatcher(1);

    for i in 0..100 {
        let call_id = format!("seq{i}");
        dispatcher.handle_event(invoke(&call_id), "client-1").await;
        let terminals = drain_terminals(&mut rx, 1).await;
        assert_eq!(terminals[0]["args"]["callId"], call_id.as_str());
        assert_eq!(terminals[0]["args"]["final"], true);
    }

    assert!(dispatcher.registry().is_empty().await);
}

/// 50 concurrent calls terminate exactly once each.
#[tokio::test]
async fn test_concurrent_burst() {
    let (dispatcher, mut rx) = create_dispatcher(100);

    for i in 0..50 {
        dispatcher
            .handle_event(invoke(&format!("burst{i}")), "client-1")
            .await;
    }

    let terminals = drain_terminals(&mut rx, 50).await;

    // One terminal per call id, no duplicates.
    let mut ids: Vec<String> = terminals
        .iter()
        .map(|t| t["args"]["callId"].as_str().unwrap().to_string())
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 50);

    assert!(dispatcher.registry().is_empty().await);
}

/// Concurrent calls overlap their delays instead of running one by one.
#[tokio::test]
async fn test_burst_overlaps_tool_delays() {
    let (dispatcher, mut rx) = create_dispatcher(100);
    let started = Instant::now();

    for i in 0..50 {
        dispatcher
            .handle_event(invoke(&format!("overlap{i}")), "client-1")
            .await;
    }
    drain_terminals(&mut rx, 50).await;

    // Serialized, 50 calls at 100ms each would need 5s.
    let elapsed = started.elapsed();
    assert!(
        elapsed < Duration::from_secs(3),
        "burst took {elapsed:?}, calls appear serialized"
    );
}

/// A burst mixing invalid invocations with valid ones answers them all.
#[tokio::test]
async fn test_mixed_burst_with_invalid_invocations() {
    let (dispatcher, mut rx) = create_dispatcher(10);

    for i in 0..20 {
        if i % 2 == 0 {
            dispatcher
                .handle_event(invoke(&format!("ok{i}")), "client-1")
                .await;
        } else {
            // Missing requestId/messageId/tool.name.
            dispatcher
                .handle_event(
                    UiEvent::new("tool.invoke", json!({"callId": format!("bad{i}")})),
                    "client-1",
                )
                .await;
        }
    }

    let terminals = drain_terminals(&mut rx, 20).await;
    let invalid = terminals
        .iter()
        .filter(|t| t["args"]["code"] == "INVALID_ARGS")
        .count();
    let succeeded = terminals
        .iter()
        .filter(|t| t["args"]["final"] == true)
        .count();
    assert_eq!(invalid, 10);
    assert_eq!(succeeded, 10);

    assert!(dispatcher.registry().is_empty().await);
}

//! Concurrent access: many calls in flight through one dispatcher.
//!
//! Tests verify that concurrent invocations each get exactly one terminal
//! notification, that cancellation storms never produce a success, and that
//! slow calls do not hold up unrelated ones.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

use uiblocks_agent::protocol::CallLimits;
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
    let dispatcher = Arc::new(
        EventDispatcher::new(registry, tools, sender).with_limits(CallLimits::default()),
    );
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

fn cancel(call_id: &str) -> UiEvent {
    UiEvent::new("tool.cancel", json!({"callId": call_id}))
}

/// Whether an outbound event is a terminal notification.
fn is_terminal(event: &Value) -> bool {
    match event["name"].as_str() {
        Some("tool.error") => true,
        Some("tool.result") => event["args"]["final"] == true,
        _ => false,
    }
}

/// Drain outbound events until every listed call has a terminal, returning
/// all events per call in arrival order.
async fn collect_until_terminal(
    rx: &mut UnboundedReceiver<SentMessage>,
    call_ids: &[String],
) -> HashMap<String, Vec<Value>> {
    let mut events: HashMap<String, Vec<Value>> = HashMap::new();
    let mut pending: Vec<String> = call_ids.to_vec();

    while !pending.is_empty() {
        let msg = timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("timed out waiting for terminals")
            .expect("transport channel closed");
        let event = msg.json();
        let call_id = event["args"]["callId"].as_str().unwrap_or("").to_string();
        if is_terminal(&event) {
            pending.retain(|id| id != &call_id);
        }
        events.entry(call_id).or_default().push(event);
    }

    events
}

// ─── Tests ─────────────────────────────────────────────────────────────────

/// Every concurrent invocation gets progress before exactly one terminal.
#[tokio::test]
async fn test_concurrent_invocations_each_terminate_once() {
    let (dispatcher, mut rx) = create_dispatcher(50);
    let call_ids: Vec<String> = (0..8).map(|i| format!("c{i}")).collect();

    for call_id in &call_ids {
        dispatcher.handle_event(invoke(call_id), "client-1").await;
    }

    let events = collect_until_terminal(&mut rx, &call_ids).await;

    for call_id in &call_ids {
        let per_call = &events[call_id];
        let terminals: Vec<&Value> = per_call.iter().filter(|e| is_terminal(e)).collect();
        assert_eq!(terminals.len(), 1, "call {call_id} should terminate once");
        assert_eq!(terminals[0]["args"]["output"]["echo"]["id"], *call_id);

        // Progress arrived before the terminal for this call.
        assert_eq!(per_call[0]["args"]["final"], false);
        assert!(is_terminal(per_call.last().unwrap()));
    }

    assert!(dispatcher.registry().is_empty().await);
}

/// A cancel storm on one call yields CANCELLED terminals and never a success.
#[tokio::test]
async fn test_cancel_storm_never_produces_success() {
    let (dispatcher, mut rx) = create_dispatcher(5_000);

    dispatcher.handle_event(invoke("c1"), "client-1").await;
    for _ in 0..5 {
        dispatcher.handle_event(cancel("c1"), "client-1").await;
    }

    // Give every response a chance to arrive, then drain.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let mut saw_cancelled = false;
    while let Ok(msg) = rx.try_recv() {
        let event = msg.json();
        if event["name"] == "tool.result" {
            assert_eq!(
                event["args"]["final"], false,
                "a cancelled call must not succeed"
            );
        }
        if event["name"] == "tool.error" {
            assert_eq!(event["args"]["code"], "CANCELLED");
            saw_cancelled = true;
        }
    }
    assert!(saw_cancelled);
    assert!(dispatcher.registry().is_empty().await);
}

/// Cancelled and completed calls interleave without affecting each other.
#[tokio::test]
async fn test_interleaved_cancel_and_completion() {
    let (dispatcher, mut rx) = create_dispatcher(150);
    let call_ids: Vec<String> = (0..6).map(|i| format!("c{i}")).collect();

    for call_id in &call_ids {
        dispatcher.handle_event(invoke(call_id), "client-1").await;
    }
    // Cancel the even calls while their delay is still pending.
    for call_id in call_ids.iter().step_by(2) {
        dispatcher.handle_event(cancel(call_id), "client-1").await;
    }

    let events = collect_until_terminal(&mut rx, &call_ids).await;

    for (i, call_id) in call_ids.iter().enumerate() {
        let terminal = events[call_id]
            .iter()
            .find(|e| is_terminal(e))
            .expect("terminal missing");
        if i % 2 == 0 {
            assert_eq!(terminal["args"]["code"], "CANCELLED");
        } else {
            assert_eq!(terminal["args"]["final"], true);
        }
    }
}

/// A slow call never delays a later invocation's progress or completion.
#[tokio::test]
async fn test_slow_call_does_not_block_others() {
    // Unregistered names fall back to a 10s echo; "echo" itself is quick.
    let (transport, mut rx) = ChannelTransport::new();
    let sender = OutboundSender::new(transport);
    let registry = Arc::new(CallRegistry::new());
    let mut tools = ToolRegistry::with_defaults(Duration::from_secs(10));
    tools.register(Arc::new(uiblocks_agent::tools::echo::EchoTool::new(
        Duration::from_millis(20),
    )));
    let dispatcher = Arc::new(EventDispatcher::new(
        registry,
        Arc::new(tools),
        sender,
    ));

    let slow = UiEvent::new(
        "tool.invoke",
        json!({
            "callId": "slow",
            "requestId": "req.slow",
            "messageId": "msg.slow",
            "tool": {"name": "slowpoke"},
            "arguments": {},
        }),
    );
    dispatcher.handle_event(slow, "client-1").await;
    let progress = timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap()
        .json();
    assert_eq!(progress["args"]["final"], false);

    // While the slow call sits in its delay, a quick call on the same
    // dispatcher completes end to end.
    dispatcher.handle_event(invoke("quick"), "client-1").await;
    let events = collect_until_terminal(&mut rx, &["quick".to_string()]).await;
    assert!(events["quick"].iter().any(|e| e["args"]["final"] == true));
    assert!(dispatcher.registry().contains("slow").await);

    // The slow call still answers its own cancellation.
    dispatcher.handle_event(cancel("slow"), "client-1").await;
    let events = collect_until_terminal(&mut rx, &["slow".to_string()]).await;
    assert!(events["slow"]
        .iter()
        .any(|e| e["args"]["code"] == "CANCELLED"));
}

//! In-memory transport capturing outbound messages for tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use super::TextTransport;
use crate::types::{AgentError, AgentResult};

/// One message recorded by [`ChannelTransport`].
#[derive(Debug, Clone)]
pub struct SentMessage {
    /// Topic the message was sent on.
    pub topic: String,
    /// Destination identity, when unicast.
    pub to: Option<String>,
    /// Merged attribute set.
    pub attributes: HashMap<String, String>,
    /// The encoded JSON text.
    pub text: String,
}

impl SentMessage {
    /// Parse the text body back into JSON.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap_or(Value::Null)
    }
}

/// Transport that hands every send to an mpsc channel, preserving order.
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<SentMessage>,
}

impl ChannelTransport {
    /// Create the transport plus the receiving end for assertions.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<SentMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl TextTransport for ChannelTransport {
    async fn send_text(
        &self,
        topic: &str,
        text: &str,
        attributes: HashMap<String, String>,
        destination: Option<&str>,
    ) -> AgentResult<()> {
        self.tx
            .send(SentMessage {
                topic: topic.to_string(),
                to: destination.map(str::to_string),
                attributes,
                text: text.to_string(),
            })
            .map_err(|_| AgentError::Transport("channel receiver dropped".to_string()))
    }
}

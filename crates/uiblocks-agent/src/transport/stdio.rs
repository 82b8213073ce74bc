//! Newline-delimited JSON transport over stdio for development and tests.
//!
//! One frame per line. Inbound frames carry `{topic, participant, text}`,
//! outbound frames `{topic, to, attributes, text}`; `text` is the encoded
//! envelope body. Protocol logging goes to stderr so stdout stays clean.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use uiblocks_proto::codec::TOPIC_UI_EVENTS;

use super::TextTransport;
use crate::protocol::EventDispatcher;
use crate::types::{AgentError, AgentResult};

#[derive(Debug, Deserialize)]
struct InboundFrame {
    topic: String,
    #[serde(default = "anonymous")]
    participant: String,
    text: String,
}

#[derive(Debug, Serialize)]
struct OutboundFrame<'a> {
    topic: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<&'a str>,
    attributes: &'a HashMap<String, String>,
    text: &'a str,
}

fn anonymous() -> String {
    "anonymous".to_string()
}

/// Stdio transport: outbound frames to stdout, inbound frames from stdin.
pub struct StdioTransport {
    stdout: Mutex<tokio::io::Stdout>,
}

impl StdioTransport {
    /// Create a new stdio transport.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            stdout: Mutex::new(tokio::io::stdout()),
        })
    }

    /// Run the inbound read loop until stdin closes.
    ///
    /// Every frame is handed to its own task so a slow tool never delays
    /// later frames, cancellation requests included.
    pub async fn run(&self, dispatcher: Arc<EventDispatcher>) -> AgentResult<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let frame: InboundFrame = match serde_json::from_str(&line) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!("dropping invalid inbound frame: {e}");
                    continue;
                }
            };

            if frame.topic != TOPIC_UI_EVENTS {
                tracing::debug!(topic = %frame.topic, "ignoring frame on unhandled topic");
                continue;
            }

            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                dispatcher.handle_text(&frame.text, &frame.participant).await;
            });
        }

        tracing::info!("stdin closed; stopping read loop");
        Ok(())
    }
}

#[async_trait]
impl TextTransport for StdioTransport {
    async fn send_text(
        &self,
        topic: &str,
        text: &str,
        attributes: HashMap<String, String>,
        destination: Option<&str>,
    ) -> AgentResult<()> {
        let frame = OutboundFrame {
            topic,
            to: destination,
            attributes: &attributes,
            text,
        };
        let mut line = serde_json::to_string(&frame)
            .map_err(|e| AgentError::Transport(format!("frame encoding failed: {e}")))?;
        line.push('\n');

        let mut stdout = self.stdout.lock().await;
        stdout
            .write_all(line.as_bytes())
            .await
            .map_err(|e| AgentError::Transport(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| AgentError::Transport(e.to_string()))
    }
}

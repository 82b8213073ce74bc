//! Sends encoded envelopes to the fixed topic for each message kind.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use uiblocks_proto::codec::{encode_content, encode_event, TOPIC_UI_BLOCKS, TOPIC_UI_EVENTS};
use uiblocks_proto::types::{ProtoError, UiEvent};

use crate::transport::TextTransport;
use crate::types::AgentResult;

/// Thin, cloneable wrapper over the transport's send primitive.
///
/// Runs the envelope codec, merges caller-supplied attributes over the
/// codec-derived set (caller wins on conflict), then performs one send.
/// Failures propagate; this layer never retries.
#[derive(Clone)]
pub struct OutboundSender {
    transport: Arc<dyn TextTransport>,
}

impl OutboundSender {
    /// Create a sender over the given transport.
    pub fn new(transport: Arc<dyn TextTransport>) -> Self {
        Self { transport }
    }

    /// Send a content announcement, unicast when `to` is given.
    pub async fn send_content(
        &self,
        payload: &Value,
        to: Option<&str>,
        extra_attributes: Option<&HashMap<String, String>>,
    ) -> AgentResult<()> {
        let (text, mut attributes) = encode_content(payload)?;
        merge(&mut attributes, extra_attributes);
        self.transport
            .send_text(TOPIC_UI_BLOCKS, &text, attributes, to)
            .await
    }

    /// Send an interaction event, unicast when `to` is given.
    pub async fn send_event(
        &self,
        event: &UiEvent,
        to: Option<&str>,
        extra_attributes: Option<&HashMap<String, String>>,
    ) -> AgentResult<()> {
        let value = serde_json::to_value(event).map_err(ProtoError::from)?;
        let (text, mut attributes) = encode_event(&value)?;
        merge(&mut attributes, extra_attributes);
        self.transport
            .send_text(TOPIC_UI_EVENTS, &text, attributes, to)
            .await
    }
}

fn merge(attributes: &mut HashMap<String, String>, extra: Option<&HashMap<String, String>>) {
    if let Some(extra) = extra {
        for (key, value) in extra {
            attributes.insert(key.clone(), value.clone());
        }
    }
}

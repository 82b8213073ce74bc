//! Transport contract and implementations.
//!
//! The protocol core depends only on this contract: reliable, ordered,
//! topic-addressed text delivery with per-message string attributes, unicast
//! to one participant identity or broadcast to the room. How bytes actually
//! move is the transport's business.

pub mod local;
pub mod stdio;

pub use local::{ChannelTransport, SentMessage};
pub use stdio::StdioTransport;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::types::AgentResult;

/// Topic-addressed text delivery, the contract consumed from the room layer.
#[async_trait]
pub trait TextTransport: Send + Sync {
    /// Send `text` on `topic` with the given attributes, unicast to
    /// `destination` when given, else broadcast.
    async fn send_text(
        &self,
        topic: &str,
        text: &str,
        attributes: HashMap<String, String>,
        destination: Option<&str>,
    ) -> AgentResult<()>;
}

//! Wire types and envelope codec for the UI Blocks v2 interaction protocol.
//!
//! Content announcements (`ui-blocks@2` payloads) and interaction events
//! share a common envelope: UTF-8 JSON text plus string-valued attributes,
//! carried on a fixed topic per message kind. This crate owns the wire
//! shapes and the codec; it has no runtime and no transport.

pub mod codec;
pub mod types;

pub use codec::{decode_event, encode_content, encode_event};
pub use types::{ProtoError, ProtoResult, ToolInvocation, ToolOutcome, UiEvent};

//! Envelope codec for the two wire topics.
//!
//! Content announcements travel on [`TOPIC_UI_BLOCKS`], interaction events on
//! [`TOPIC_UI_EVENTS`]. The codec validates the schema tag, derives the
//! per-message attribute set, and otherwise passes payloads through verbatim:
//! no identifier or timestamp injection.

use std::collections::HashMap;

use serde_json::Value;

use crate::types::{ProtoError, ProtoResult, UiEvent};

/// Topic carrying content announcements.
pub const TOPIC_UI_BLOCKS: &str = "lk.ui.blocks";
/// Topic carrying interaction events.
pub const TOPIC_UI_EVENTS: &str = "lk.ui.events";
/// Mandatory schema tag on content announcements.
pub const SCHEMA_UI_BLOCKS: &str = "ui-blocks@2";
/// Protocol version carried in the `version` attribute.
pub const PROTOCOL_VERSION: &str = "2";
/// Content type of content announcements.
pub const CONTENT_TYPE_UI_BLOCKS: &str = "application/vnd.ui-blocks+json";

/// Attribute key: content type.
pub const ATTR_CONTENT_TYPE: &str = "content-type";
/// Attribute key: protocol version.
pub const ATTR_VERSION: &str = "version";
/// Attribute key: request correlation id.
pub const ATTR_REQUEST_ID: &str = "requestId";

/// Encode a content announcement into JSON text plus attributes.
///
/// The payload must be a JSON object tagged `schema == "ui-blocks@2"`. The
/// attribute set is `{content-type, version}`, with `requestId` added iff the
/// payload carries a non-empty string `requestId`. The body itself is not
/// mutated.
pub fn encode_content(payload: &Value) -> ProtoResult<(String, HashMap<String, String>)> {
    let obj = payload.as_object().ok_or_else(|| {
        ProtoError::InvalidPayload("content payload must be a JSON object".to_string())
    })?;

    match obj.get("schema").and_then(Value::as_str) {
        Some(SCHEMA_UI_BLOCKS) => {}
        Some(other) => {
            return Err(ProtoError::SchemaMismatch {
                expected: SCHEMA_UI_BLOCKS,
                found: format!("\"{other}\""),
            })
        }
        None => {
            return Err(ProtoError::SchemaMismatch {
                expected: SCHEMA_UI_BLOCKS,
                found: "no schema tag".to_string(),
            })
        }
    }

    let mut attributes = HashMap::from([
        (
            ATTR_CONTENT_TYPE.to_string(),
            CONTENT_TYPE_UI_BLOCKS.to_string(),
        ),
        (ATTR_VERSION.to_string(), PROTOCOL_VERSION.to_string()),
    ]);
    if let Some(request_id) = obj.get("requestId").and_then(Value::as_str) {
        if !request_id.is_empty() {
            attributes.insert(ATTR_REQUEST_ID.to_string(), request_id.to_string());
        }
    }

    Ok((serde_json::to_string(payload)?, attributes))
}

/// Encode an interaction event into JSON text plus attributes.
///
/// The event must be a JSON object; the attribute set is `{version}`.
pub fn encode_event(event: &Value) -> ProtoResult<(String, HashMap<String, String>)> {
    if !event.is_object() {
        return Err(ProtoError::InvalidPayload(
            "event must be a JSON object".to_string(),
        ));
    }

    let attributes = HashMap::from([(ATTR_VERSION.to_string(), PROTOCOL_VERSION.to_string())]);
    Ok((serde_json::to_string(event)?, attributes))
}

/// Decode inbound event text into a [`UiEvent`].
///
/// Fails with [`ProtoError::MalformedJson`] on parse errors; the caller logs
/// and drops such messages, since no reliable `callId` can be recovered to
/// address a response.
pub fn decode_event(text: &str) -> ProtoResult<UiEvent> {
    Ok(serde_json::from_str(text)?)
}

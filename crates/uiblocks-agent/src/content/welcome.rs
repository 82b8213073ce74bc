//! The initial welcome announcement.

use serde_json::{json, Value};

use uiblocks_proto::codec::SCHEMA_UI_BLOCKS;

use crate::tools::ToolDefinition;

/// Build the initial `ui-blocks@2` welcome payload.
///
/// Pure data for the client renderer; the protocol core never interprets it.
/// Actions are wired to the registered tool definitions, schemas included,
/// so the client can validate arguments before invoking.
pub fn welcome_payload(tools: &[ToolDefinition]) -> Value {
    let actions: Vec<Value> = tools
        .iter()
        .map(|tool| {
            let mut action = json!({"type": "tool", "name": tool.name});
            if let Some(schema) = &tool.arguments_schema {
                action["argumentsSchema"] = schema.clone();
            }
            if let Some(schema) = &tool.result_schema {
                action["resultSchema"] = schema.clone();
            }
            json!({
                "id": format!("act.{}", tool.name),
                "label": tool.description.clone().unwrap_or_else(|| tool.name.clone()),
                "style": "primary",
                "action": action,
            })
        })
        .collect();

    json!({
        "schema": SCHEMA_UI_BLOCKS,
        "requestId": "req.welcome",
        "messageId": "msg.welcome",
        "lang": "en-US",
        "text": "Session ready.",
        "blocks": [
            {
                "id": "t.title",
                "type": "text",
                "content": "Agent tools",
                "variant": "title",
                "format": "plain"
            },
            {"id": "act.main", "type": "actions", "items": actions},
        ],
    })
}

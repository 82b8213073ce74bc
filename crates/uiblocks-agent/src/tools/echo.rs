//! Tool: echo, the reference executor.
//!
//! Emits one progress notification immediately, simulates a short unit of
//! work, then succeeds with an output echoing the supplied arguments and a
//! result-card `ui` payload. Also serves as the registry fallback, so any
//! unregistered tool name gets this behavior.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use uiblocks_proto::codec::SCHEMA_UI_BLOCKS;
use uiblocks_proto::types::ToolOutput;

use super::{Tool, ToolContext, ToolDefinition};
use crate::types::AgentResult;

/// The reference tool.
pub struct EchoTool {
    delay: Duration,
}

impl EchoTool {
    /// Create an echo tool with the given simulated work delay.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    fn result_card(ctx: &ToolContext) -> Value {
        let invocation = &ctx.invocation;
        json!({
            "schema": SCHEMA_UI_BLOCKS,
            "requestId": invocation.request_id,
            "messageId": format!("msg.{}", invocation.call_id),
            "lang": "en-US",
            "text": "Done.",
            "blocks": [
                {
                    "id": "card.result",
                    "type": "card",
                    "title": "Tool result",
                    "body": [
                        {
                            "id": "kv.result",
                            "type": "kv",
                            "items": [
                                {"id": "kv.tool", "key": "Tool", "value": invocation.tool_name},
                                {
                                    "id": "kv.block",
                                    "key": "Origin block",
                                    "value": invocation.origin_block_id.as_deref().unwrap_or("-")
                                },
                            ],
                        },
                        {
                            "id": "btn.ok",
                            "type": "button",
                            "text": "OK",
                            "action": {"type": "tool", "name": "acknowledge"}
                        },
                    ],
                }
            ],
        })
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "echo".to_string(),
            description: Some("Echo the supplied arguments back".to_string()),
            arguments_schema: Some(json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "$id": "urn:tool:echo:args",
                "type": "object"
            })),
            result_schema: Some(json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "$id": "urn:tool:echo:result",
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "ok": {"type": "boolean"},
                    "echo": {"type": "object"}
                },
                "required": ["ok", "echo"]
            })),
        }
    }

    async fn run(&self, ctx: &ToolContext) -> AgentResult<ToolOutput> {
        ctx.progress(0.0, Some(json!({"text": "Working..."}))).await?;

        // Simulated processing; a cancellation checkpoint like any await.
        tokio::time::sleep(self.delay).await;

        Ok(ToolOutput {
            output: json!({"ok": true, "echo": ctx.invocation.arguments}),
            ui: Some(Self::result_card(ctx)),
        })
    }
}

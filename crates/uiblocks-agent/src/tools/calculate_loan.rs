//! Tool: calculate_loan, a housing-fund loan quote.
//!
//! Arguments and result shapes match the schemas the welcome card advertises,
//! so clients can validate input before invoking.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use uiblocks_proto::codec::SCHEMA_UI_BLOCKS;
use uiblocks_proto::types::ToolOutput;

use super::{Tool, ToolContext, ToolDefinition};
use crate::types::{AgentError, AgentResult};

/// Annual rate quoted for every applicant.
const ANNUAL_RATE: f64 = 0.031;
/// Quote ceiling.
const MAX_AMOUNT_CAP: f64 = 1_000_000.0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoanParams {
    monthly_deposit: f64,
    years: u32,
    balance: f64,
}

/// Loan quote tool.
pub struct CalculateLoanTool {
    delay: Duration,
}

impl CalculateLoanTool {
    /// Create a loan quote tool with the given simulated work delay.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    fn quote(params: &LoanParams) -> (f64, String) {
        // Ten times the balance plus twice the projected deposits, capped.
        let projected = params.monthly_deposit * 12.0 * f64::from(params.years);
        let max_amount = (params.balance * 10.0 + projected * 2.0).min(MAX_AMOUNT_CAP);
        let explain = format!(
            "Based on a balance of {:.2} and {} years of deposits at {:.2}/month.",
            params.balance, params.years, params.monthly_deposit
        );
        (max_amount, explain)
    }

    fn quote_card(ctx: &ToolContext, max_amount: f64) -> Value {
        json!({
            "schema": SCHEMA_UI_BLOCKS,
            "requestId": ctx.invocation.request_id,
            "messageId": format!("msg.{}", ctx.invocation.call_id),
            "lang": "en-US",
            "text": "Quote ready.",
            "blocks": [
                {
                    "id": "card.quote",
                    "type": "card",
                    "title": "Loan quote",
                    "body": [
                        {
                            "id": "kv.quote",
                            "type": "kv",
                            "items": [
                                {
                                    "id": "kv.max",
                                    "key": "Maximum amount",
                                    "value": format!("{max_amount:.2}")
                                },
                                {
                                    "id": "kv.rate",
                                    "key": "Annual rate",
                                    "value": format!("{:.1}%", ANNUAL_RATE * 100.0)
                                },
                            ],
                        }
                    ],
                }
            ],
        })
    }
}

#[async_trait]
impl Tool for CalculateLoanTool {
    fn name(&self) -> &'static str {
        "calculate_loan"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "calculate_loan".to_string(),
            description: Some("Estimate the maximum loan amount".to_string()),
            arguments_schema: Some(json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "$id": "urn:tool:calculate_loan:args",
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "monthlyDeposit": {"type": "number", "minimum": 0},
                    "years": {"type": "integer", "minimum": 1, "maximum": 40},
                    "balance": {"type": "number", "minimum": 0}
                },
                "required": ["monthlyDeposit", "years", "balance"]
            })),
            result_schema: Some(json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "$id": "urn:tool:calculate_loan:result",
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "maxAmount": {"type": "number"},
                    "annualRate": {"type": "number"},
                    "explain": {"type": "string"}
                },
                "required": ["maxAmount", "annualRate"]
            })),
        }
    }

    async fn run(&self, ctx: &ToolContext) -> AgentResult<ToolOutput> {
        let params: LoanParams = serde_json::from_value(ctx.invocation.arguments.clone())
            .map_err(|e| AgentError::Tool(format!("invalid loan arguments: {e}")))?;

        ctx.progress(0.0, Some(json!({"text": "Calculating quote..."})))
            .await?;

        tokio::time::sleep(self.delay).await;

        let (max_amount, explain) = Self::quote(&params);
        Ok(ToolOutput {
            output: json!({
                "maxAmount": max_amount,
                "annualRate": ANNUAL_RATE,
                "explain": explain,
            }),
            ui: Some(Self::quote_card(ctx, max_amount)),
        })
    }
}

//! MCP tool definitions and handlers

use crate::protocol::*;
use anyhow::Result;
use forecast_agent_core::{Pipeline, PipelineInput};
use serde_json::Value;

pub fn get_demand_forecast_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_demand_forecast".to_string(),
        description: "Get the latest demand forecast for one or more items. Item names are \
                      matched against the item catalog before the forecast is looked up."
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "item_names": {
                    "description": "Single item name, comma-separated item names, or a list of item names",
                    "anyOf": [
                        { "type": "string" },
                        { "type": "array", "items": { "type": "string" } }
                    ]
                }
            },
            "required": ["item_names"]
        }),
    }
}

pub fn get_multiple_forecasts_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_multiple_forecasts".to_string(),
        description: "Get demand forecasts for a list of items in one call".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "items": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Item names, one per entry"
                }
            },
            "required": ["items"]
        }),
    }
}

pub async fn handle_get_demand_forecast(pipeline: &Pipeline, args: Value) -> Result<ToolResult> {
    let raw = args
        .get("item_names")
        .ok_or_else(|| anyhow::anyhow!("Missing item_names"))?;
    let input = PipelineInput::from_value(raw)?;
    run_pipeline(pipeline, &input).await
}

pub async fn handle_get_multiple_forecasts(pipeline: &Pipeline, args: Value) -> Result<ToolResult> {
    let raw = args
        .get("items")
        .ok_or_else(|| anyhow::anyhow!("Missing items"))?;
    if !raw.is_array() {
        anyhow::bail!("items must be a list of item names");
    }
    let input = PipelineInput::from_value(raw)?;
    run_pipeline(pipeline, &input).await
}

async fn run_pipeline(pipeline: &Pipeline, input: &PipelineInput) -> Result<ToolResult> {
    let result = pipeline.run(input).await?;

    Ok(ToolResult {
        content: vec![Content::Text {
            text: result.demand_forecast.clone(),
        }],
        structured_content: Some(serde_json::to_value(&result)?),
        is_error: None,
    })
}

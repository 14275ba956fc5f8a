//! Output formatters

pub mod markdown;
pub mod terminal;

use crate::app::OutputFormat;
use forecast_agent_core::{ForecastRecord, PipelineResult};
use serde::Serialize;

/// Render a full pipeline result
pub fn format_pipeline_result(result: &PipelineResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(result),
        OutputFormat::Md => markdown::format_pipeline_result(result),
        OutputFormat::Cli => terminal::format_pipeline_result(result),
    }
}

/// Render a retrieval + selection outcome
pub fn format_match(item: &str, selected: Option<&str>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "input_item": item,
            "selected_item": selected,
        })),
        OutputFormat::Md => format!(
            "| Input | Matched |\n|---|---|\n| {} | {} |\n",
            markdown::escape_cell(item),
            markdown::escape_cell(selected.unwrap_or("None"))
        ),
        OutputFormat::Cli => terminal::format_match(item, selected),
    }
}

/// Render a direct store lookup
pub fn format_forecast(item: &str, record: Option<&ForecastRecord>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&record),
        _ => format!(
            "{}\n",
            forecast_agent_core::pipeline::format_forecast(item, record)
        ),
    }
}

/// Render a list of item names
pub fn format_items(items: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&serde_json::json!({ "items": items })),
        OutputFormat::Md => items.iter().map(|i| format!("- {}\n", i)).collect(),
        OutputFormat::Cli => items.iter().map(|i| format!("{}\n", i)).collect(),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string()) + "\n"
}

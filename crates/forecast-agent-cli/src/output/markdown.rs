//! Markdown output formatter

use forecast_agent_core::pipeline::forecast_value;
use forecast_agent_core::PipelineResult;

pub fn format_pipeline_result(result: &PipelineResult) -> String {
    let mut output = String::from("# Demand Forecast\n\n");
    output.push_str(&result.demand_forecast);
    output.push_str("\n\n| Input | Matched | Forecast | Date |\n|---|---|---|---|\n");

    for item in &result.results {
        let (value, date) = match item.demand_forecast {
            Some(ref record) => (forecast_value(record), record.forecast_date.to_string()),
            None => ("-".to_string(), "-".to_string()),
        };
        output.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            escape_cell(&item.input_item),
            escape_cell(item.selected_item.as_deref().unwrap_or("None")),
            value,
            date
        ));
    }
    output
}

pub fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

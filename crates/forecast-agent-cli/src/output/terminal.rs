//! Plain terminal output

use forecast_agent_core::PipelineResult;

pub fn format_pipeline_result(result: &PipelineResult) -> String {
    let mut output = String::new();
    output.push_str(&result.demand_forecast);
    output.push('\n');

    let unmatched: Vec<&str> = result
        .results
        .iter()
        .filter(|r| r.selected_item.is_none())
        .map(|r| r.input_item.as_str())
        .collect();
    if !unmatched.is_empty() {
        output.push_str(&format!("\nUnmatched: {}\n", unmatched.join(", ")));
    }
    output
}

pub fn format_match(item: &str, selected: Option<&str>) -> String {
    match selected {
        Some(name) => format!("{} -> {}\n", item, name),
        None => format!("{} -> (no match)\n", item),
    }
}

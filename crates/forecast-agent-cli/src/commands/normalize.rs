//! Normalize command

use crate::app::{NormalizeArgs, OutputFormat};
use crate::output::format_items;
use anyhow::Result;
use forecast_agent_core::{normalize_input, PipelineInput};

pub fn run(args: NormalizeArgs, format: OutputFormat) -> Result<()> {
    let items = normalize_input(&PipelineInput::Text(args.input));
    print!("{}", format_items(&items, format));
    Ok(())
}

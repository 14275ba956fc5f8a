//! Run command

use crate::app::{OutputFormat, RunArgs};
use crate::output::format_pipeline_result;
use anyhow::Result;
use forecast_agent_core::{Config, Pipeline, PipelineInput};

pub async fn run(args: RunArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let mut pipeline = Pipeline::from_config(config)?;
    if let Some(mode) = args.mode {
        pipeline = pipeline.with_mode(mode.into());
    }

    let input = if args.list {
        PipelineInput::Items(args.input)
    } else {
        PipelineInput::Text(args.input.join(" "))
    };

    tracing::debug!("Running {:?} pipeline for: {}", pipeline.mode(), input);
    let result = pipeline.run(&input).await?;
    print!("{}", format_pipeline_result(&result, format));
    Ok(())
}

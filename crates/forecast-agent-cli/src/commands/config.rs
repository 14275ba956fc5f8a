//! Config command

use crate::app::OutputFormat;
use anyhow::Result;
use forecast_agent_core::Config;

pub fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let redacted = config.redacted();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&redacted)?),
        _ => print!("{}", serde_yaml::to_string(&redacted)?),
    }
    Ok(())
}

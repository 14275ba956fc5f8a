//! Match command

use crate::app::{MatchArgs, OutputFormat};
use crate::output::format_match;
use anyhow::{bail, Result};
use forecast_agent_core::{Config, Pipeline};

pub async fn run(args: MatchArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let item = args.item.trim();
    if item.is_empty() {
        bail!("Item name must not be blank");
    }

    let pipeline = Pipeline::from_config(config)?;
    let selection = pipeline.match_item(item).await;
    print!("{}", format_match(item, selection.matched_name(), format));
    Ok(())
}

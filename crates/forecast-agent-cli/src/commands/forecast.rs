//! Forecast command

use crate::app::{ForecastArgs, OutputFormat};
use crate::output::format_forecast;
use anyhow::Result;
use forecast_agent_core::{open_store, Config};

pub async fn run(args: ForecastArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let store = open_store(&config.store)?;
    let record = store.latest_forecast(&args.item).await?;
    print!("{}", format_forecast(&args.item, record.as_ref(), format));
    Ok(())
}

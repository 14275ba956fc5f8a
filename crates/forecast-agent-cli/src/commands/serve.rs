//! HTTP and MCP server commands

use crate::app::ServeArgs;
use anyhow::Result;
use forecast_agent_core::{Config, Pipeline};
use std::sync::Arc;

pub async fn run_http(args: ServeArgs, config: &Config) -> Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    forecast_agent_http::serve(args.bind, Arc::new(pipeline)).await
}

pub async fn run_mcp(config: &Config) -> Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    forecast_agent_mcp::start_server(&pipeline).await
}

//! Forecast Agent CLI
//!
//! Item-name resolution and demand-forecast lookup from the command line,
//! plus the HTTP and MCP front ends.

use anyhow::Result;
use clap::Parser;
use forecast_agent_core::error::exit_codes;
use forecast_agent_core::{Config, ForecastAgentError};

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        match cli.command {
            Commands::Serve(_) | Commands::Mcp => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        }
    };

    // Logs go to stderr; stdout carries command output and the MCP channel
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();

    if let Err(e) = dispatch(cli).await {
        let code = e
            .downcast_ref::<ForecastAgentError>()
            .map(ForecastAgentError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        eprintln!("Error: {:#}", e);
        std::process::exit(code);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let format = cli.format;
    let config = || load_config(cli.config.as_deref());

    match cli.command {
        Commands::Run(args) => commands::run::run(args, &config()?, format).await,
        Commands::Normalize(args) => commands::normalize::run(args, format),
        Commands::Match(args) => commands::match_item::run(args, &config()?, format).await,
        Commands::Forecast(args) => commands::forecast::run(args, &config()?, format).await,
        Commands::ConvertCsv(args) => commands::convert::run_convert(args),
        Commands::ImportCsv(args) => commands::convert::run_import(args, &config()?),
        Commands::Config => commands::config::run(&config()?, format),
        Commands::Serve(args) => commands::serve::run_http(args, &config()?).await,
        Commands::Mcp => commands::serve::run_mcp(&config()?).await,
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

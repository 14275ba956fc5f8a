//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use forecast_agent_core::PipelineMode;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "forecast-agent")]
#[command(
    author,
    version,
    about = "Resolve inventory item names to their latest demand forecasts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Config file (defaults to FORECAST_AGENT_CONFIG or the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline for a query or item list
    Run(RunArgs),

    /// Show how an input is split into item names
    Normalize(NormalizeArgs),

    /// Retrieve candidates for one item and select the best match
    Match(MatchArgs),

    /// Look up the latest forecast for an exact canonical item name
    Forecast(ForecastArgs),

    /// Write one markdown document per CSV row for the retrieval knowledge base
    ConvertCsv(ConvertCsvArgs),

    /// Load forecast rows from a CSV file into the SQLite store
    ImportCsv(ImportCsvArgs),

    /// Print the effective configuration with secrets masked
    Config,

    /// Start the HTTP API
    Serve(ServeArgs),

    /// Start MCP server
    Mcp,
}

#[derive(Args)]
pub struct RunArgs {
    /// Query text or item names
    #[arg(required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Treat every argument as one item name instead of joining them into one string
    #[arg(long)]
    pub list: bool,

    /// Override the configured pipeline mode
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

#[derive(Args)]
pub struct NormalizeArgs {
    /// Raw input string
    pub input: String,
}

#[derive(Args)]
pub struct MatchArgs {
    /// Item name as the user wrote it
    pub item: String,
}

#[derive(Args)]
pub struct ForecastArgs {
    /// Canonical item name
    pub item: String,
}

#[derive(Args)]
pub struct ConvertCsvArgs {
    /// Source CSV file with a header row
    pub input: PathBuf,

    /// Directory for the generated documents
    pub output_dir: PathBuf,
}

#[derive(Args)]
pub struct ImportCsvArgs {
    /// CSV with forecast_date, category_key (or categorylv5) and demand_forecast columns
    pub input: PathBuf,

    /// SQLite database file (defaults to the configured store path)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Direct,
    Assisted,
}

impl From<ModeArg> for PipelineMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Direct => PipelineMode::Direct,
            ModeArg::Assisted => PipelineMode::Assisted,
        }
    }
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Cli,
    Json,
    Md,
}

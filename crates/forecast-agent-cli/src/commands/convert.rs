//! CSV conversion and import commands

use crate::app::{ConvertCsvArgs, ImportCsvArgs};
use anyhow::Result;
use forecast_agent_core::retrieval::convert_csv_to_markdown;
use forecast_agent_core::{Config, SqliteForecastStore};

pub fn run_convert(args: ConvertCsvArgs) -> Result<()> {
    let written = convert_csv_to_markdown(&args.input, &args.output_dir)?;
    println!(
        "Wrote {} documents to {}",
        written.len(),
        args.output_dir.display()
    );
    Ok(())
}

pub fn run_import(args: ImportCsvArgs, config: &Config) -> Result<()> {
    let db_path = args.db.unwrap_or_else(|| config.store.sqlite_path.clone());
    let store = SqliteForecastStore::open(&db_path)?;
    let count = store.import_csv(&args.input)?;
    println!("Imported {} forecast rows into {}", count, db_path.display());
    Ok(())
}

//! Knowledge-base document export from forecast CSV files

use crate::error::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name for the `n`th exported row (1-based)
pub fn document_name(n: usize) -> String {
    format!("demand_forecast_{}.md", n)
}

/// Write one markdown document per CSV row into `output_dir`.
///
/// Each document holds one `header: value` line per column, in column order.
/// Returns the written paths in row order.
pub fn convert_csv_to_markdown(input: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(input)?;
    let headers = reader.headers()?.clone();

    let mut written = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let path = output_dir.join(document_name(index + 1));
        let mut file = fs::File::create(&path)?;
        for (header, value) in headers.iter().zip(row.iter()) {
            writeln!(file, "{}: {}", header, value)?;
        }
        written.push(path);
    }

    tracing::info!(
        input = %input.display(),
        output_dir = %output_dir.display(),
        documents = written.len(),
        "exported forecast rows"
    );
    Ok(written)
}

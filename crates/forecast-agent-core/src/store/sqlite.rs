//! SQLite forecast store for local runs and tests

use super::{ForecastRecord, ForecastStore};
use crate::error::{ForecastAgentError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::Mutex;

const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS demand_forecast (
    forecast_date TEXT NOT NULL,
    category_key TEXT NOT NULL,
    demand_forecast REAL
);

CREATE INDEX IF NOT EXISTS idx_demand_forecast_key_date
    ON demand_forecast(category_key, forecast_date);
"#;

const LATEST_FORECAST: &str = "SELECT forecast_date, category_key, demand_forecast \
     FROM demand_forecast \
     WHERE category_key = ?1 \
     ORDER BY forecast_date DESC \
     LIMIT 1";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Forecast table in a single SQLite file
pub struct SqliteForecastStore {
    conn: Mutex<Connection>,
}

impl SqliteForecastStore {
    /// Open or create a store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Fresh in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Create the forecast table if missing
    pub fn initialize(&self) -> Result<()> {
        self.lock()?.execute_batch(CREATE_TABLES)?;
        Ok(())
    }

    pub fn insert_forecast(&self, record: &ForecastRecord) -> Result<()> {
        self.lock()?.execute(
            "INSERT INTO demand_forecast (forecast_date, category_key, demand_forecast)
             VALUES (?1, ?2, ?3)",
            params![
                record.forecast_date.format(DATE_FORMAT).to_string(),
                record.category_key,
                record.demand_forecast
            ],
        )?;
        Ok(())
    }

    /// Import rows from a CSV file with `forecast_date`, `category_key` and
    /// `demand_forecast` columns. `categorylv5` is accepted for the key column.
    /// All rows go in one transaction; returns the number imported.
    pub fn import_csv(&self, path: &Path) -> Result<usize> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        let column = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
                .ok_or_else(|| {
                    ForecastAgentError::Parse(format!(
                        "{} has no {} column",
                        path.display(),
                        names.join("/")
                    ))
                })
        };
        let date_col = column(&["forecast_date"])?;
        let key_col = column(&["category_key", "categorylv5"])?;
        let value_col = column(&["demand_forecast"])?;

        let mut records = Vec::new();
        for (line, row) in reader.records().enumerate() {
            let row = row?;
            let field = |i: usize| row.get(i).map(str::trim).unwrap_or_default();

            let forecast_date = parse_date(field(date_col))?;
            let demand_forecast = match field(value_col) {
                "" => None,
                raw => Some(raw.parse::<f64>().map_err(|e| {
                    ForecastAgentError::Parse(format!(
                        "Row {}: bad demand_forecast {:?}: {}",
                        line + 2,
                        raw,
                        e
                    ))
                })?),
            };
            records.push(ForecastRecord {
                forecast_date,
                category_key: field(key_col).to_string(),
                demand_forecast,
            });
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO demand_forecast (forecast_date, category_key, demand_forecast)
                 VALUES (?1, ?2, ?3)",
            )?;
            for record in &records {
                stmt.execute(params![
                    record.forecast_date.format(DATE_FORMAT).to_string(),
                    record.category_key,
                    record.demand_forecast
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!(path = %path.display(), rows = records.len(), "imported forecasts");
        Ok(records.len())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ForecastAgentError::Other(anyhow::anyhow!("forecast store lock poisoned")))
    }

    fn query_latest(&self, item: &str) -> Result<Option<ForecastRecord>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;

        let row = tx
            .query_row(LATEST_FORECAST, params![item], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                ))
            })
            .optional();

        // Dropping the transaction without commit rolls it back
        let row = row?;
        tx.commit()?;

        row.map(|(date, category_key, demand_forecast)| {
            Ok(ForecastRecord {
                forecast_date: parse_date(&date)?,
                category_key,
                demand_forecast,
            })
        })
        .transpose()
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    // Accept timestamps by keeping only the date part
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|e| ForecastAgentError::Parse(format!("Bad forecast date {:?}: {}", raw, e)))
}

#[async_trait]
impl ForecastStore for SqliteForecastStore {
    async fn latest_forecast(&self, item: &str) -> Result<Option<ForecastRecord>> {
        self.query_latest(item)
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

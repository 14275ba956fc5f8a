//! Forecast stores
//!
//! A store answers one question: the most recent forecast row for an exact
//! canonical item name. Every lookup is its own read-only transaction.

mod postgres;
mod sqlite;

pub use postgres::PostgresForecastStore;
pub use sqlite::SqliteForecastStore;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Latest forecast row for one canonical item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub forecast_date: NaiveDate,
    pub category_key: String,
    pub demand_forecast: Option<f64>,
}

/// Read access to precomputed demand forecasts
#[async_trait]
pub trait ForecastStore: Send + Sync {
    /// Latest record whose category key equals `item`, if any
    async fn latest_forecast(&self, item: &str) -> Result<Option<ForecastRecord>>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Build the configured store
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn ForecastStore>> {
    match config.backend {
        StoreBackend::Postgres => Ok(Arc::new(PostgresForecastStore::from_config(config)?)),
        StoreBackend::Sqlite => Ok(Arc::new(SqliteForecastStore::open(&config.sqlite_path)?)),
    }
}

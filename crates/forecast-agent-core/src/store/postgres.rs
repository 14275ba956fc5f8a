//! PostgreSQL forecast store

use super::{ForecastRecord, ForecastStore};
use crate::config::{PostgresConfig, StoreConfig};
use crate::error::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgConnection, PgPool, Row};
use std::time::Duration;

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Forecast store backed by a lazily connected pool
pub struct PostgresForecastStore {
    pool: PgPool,
    query: String,
}

impl PostgresForecastStore {
    /// Wrap an existing pool. `table` and `key_column` must already be validated identifiers.
    pub fn new(pool: PgPool, table: &str, key_column: &str) -> Self {
        Self {
            pool,
            query: latest_forecast_query(table, key_column),
        }
    }

    /// Build a pool from connection parameters; no connection is made until the first lookup
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy_with(connect_options(&config.postgres));

        tracing::debug!(
            host = %config.postgres.host,
            port = config.postgres.port,
            dbname = %config.postgres.dbname,
            table = %config.table,
            "configured postgres forecast store"
        );

        Ok(Self::new(pool, &config.table, &config.key_column))
    }

    async fn query_latest(
        &self,
        conn: &mut PgConnection,
        item: &str,
    ) -> Result<Option<ForecastRecord>> {
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *conn)
            .await?;

        let row = sqlx::query(&self.query)
            .bind(item)
            .fetch_optional(&mut *conn)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(ForecastRecord {
            forecast_date: row.try_get("forecast_date")?,
            category_key: row.try_get("category_key")?,
            demand_forecast: row.try_get("demand_forecast")?,
        }))
    }
}

fn connect_options(config: &PostgresConfig) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .database(&config.dbname);

    match config.password {
        Some(ref password) => options.password(password),
        None => options,
    }
}

/// Latest-by-date query against `table`, keyed on `key_column`
pub(crate) fn latest_forecast_query(table: &str, key_column: &str) -> String {
    format!(
        "SELECT forecast_date::date AS forecast_date, \
         {key}::text AS category_key, \
         demand_forecast::double precision AS demand_forecast \
         FROM {table} \
         WHERE {key} = $1 AND forecast_date IS NOT NULL \
         ORDER BY forecast_date DESC \
         LIMIT 1",
        key = key_column,
        table = table,
    )
}

#[async_trait]
impl ForecastStore for PostgresForecastStore {
    async fn latest_forecast(&self, item: &str) -> Result<Option<ForecastRecord>> {
        let mut tx = self.pool.begin().await?;

        match self.query_latest(&mut tx, item).await {
            Ok(record) => {
                tx.commit().await?;
                Ok(record)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(item, "Rollback after failed lookup also failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    fn name(&self) -> &str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_forecast_query() {
        let sql = latest_forecast_query("taokae_internal_data.demand_forecast", "categorylv5");
        assert!(sql.contains("FROM taokae_internal_data.demand_forecast"));
        assert!(sql.contains("categorylv5::text AS category_key"));
        assert!(sql.contains("WHERE categorylv5 = $1 AND forecast_date IS NOT NULL"));
        assert!(sql.ends_with("ORDER BY forecast_date DESC LIMIT 1"));
    }

    #[tokio::test]
    async fn test_from_config_is_lazy() {
        let mut config = StoreConfig::default();
        config.postgres.host = "127.0.0.1".to_string();
        config.postgres.port = 9;
        config.table = "demand_forecast".to_string();
        config.key_column = "categorylv5".to_string();

        let store = PostgresForecastStore::from_config(&config).unwrap();
        assert_eq!(store.name(), "postgres");
        assert!(store.query.contains("FROM demand_forecast"));
    }
}

//! Configuration management
//!
//! Values come from a YAML file when one exists; every field missing from the
//! file falls back to the deployment environment variables
//! (`MODEL_URL`, `RAGFLOW_URL`, `PG_HOST`, ...).

use crate::error::{ForecastAgentError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

lazy_static! {
    static ref SQL_IDENTIFIER: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").unwrap();
}

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "FORECAST_AGENT_CONFIG";

const REDACTED: &str = "****";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chat-completion service used for extraction, selection and synthesis
    #[serde(default)]
    pub llm: LLMServiceConfig,

    /// Knowledge-base retrieval service
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Forecast store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Orchestration settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// LLM service configuration (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL including the API version prefix, e.g. `https://api.openai.com/v1`
    #[serde(default = "default_llm_url")]
    pub url: String,

    #[serde(default = "default_chat_model")]
    pub model: String,

    #[serde(default = "default_llm_api_key")]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Optional completion token cap
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// Send `response_format: json_schema` for structured extraction
    #[serde(default = "default_structured_output")]
    pub structured_output: bool,
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: default_llm_url(),
            model: default_chat_model(),
            api_key: default_llm_api_key(),
            temperature: default_temperature(),
            max_tokens: None,
            timeout_secs: default_llm_timeout(),
            structured_output: default_structured_output(),
        }
    }
}

fn default_llm_url() -> String {
    env_or("MODEL_URL", "http://localhost:8000/v1")
}

fn default_chat_model() -> String {
    env_or("MODEL_NAME", "gpt-4o-mini")
}

fn default_llm_api_key() -> Option<String> {
    env_non_empty("MODEL_API_KEY")
}

fn default_temperature() -> f32 {
    env_parse("MODEL_TEMPERATURE").unwrap_or(0.0)
}

fn default_llm_timeout() -> u64 {
    env_parse("MODEL_TIMEOUT_SECS").unwrap_or(60)
}

fn default_structured_output() -> bool {
    env_parse("MODEL_STRUCTURED_OUTPUT").unwrap_or(true)
}

/// Retrieval service configuration (RAGFlow)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_retrieval_url")]
    pub url: String,

    #[serde(default = "default_retrieval_api_key")]
    pub api_key: Option<String>,

    /// Datasets every search is scoped to
    #[serde(default = "default_dataset_ids")]
    pub dataset_ids: Vec<String>,

    /// Maximum candidates requested per item
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Hard wall-clock limit around a single retrieval call
    #[serde(default = "default_retrieval_timeout")]
    pub timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            url: default_retrieval_url(),
            api_key: default_retrieval_api_key(),
            dataset_ids: default_dataset_ids(),
            top_k: default_top_k(),
            timeout_secs: default_retrieval_timeout(),
        }
    }
}

fn default_retrieval_url() -> String {
    env_or("RAGFLOW_URL", "http://localhost:9380")
}

fn default_retrieval_api_key() -> Option<String> {
    env_non_empty("RAGFLOW_API_KEY")
}

fn default_dataset_ids() -> Vec<String> {
    let raw = std::env::var("RAGFLOW_ITEM_NAME_IDS")
        .or_else(|_| std::env::var("RAGFLOW_PO_DATASET_IDS"))
        .unwrap_or_default();
    parse_dataset_ids(&raw)
}

fn default_top_k() -> usize {
    env_parse("TOP_K").unwrap_or(5)
}

fn default_retrieval_timeout() -> u64 {
    env_parse("RETRIEVAL_TIMEOUT_SECS").unwrap_or(45)
}

/// Which forecast store backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = ForecastAgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ForecastAgentError::Config(format!(
                "Unknown forecast store backend: {}",
                other
            ))),
        }
    }
}

/// Forecast store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    #[serde(default)]
    pub postgres: PostgresConfig,

    /// Forecast table, optionally schema-qualified (Postgres only)
    #[serde(default = "default_table")]
    pub table: String,

    /// Column holding the canonical item name (Postgres only)
    #[serde(default = "default_key_column")]
    pub key_column: String,

    /// Database file for the SQLite backend
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            postgres: PostgresConfig::default(),
            table: default_table(),
            key_column: default_key_column(),
            sqlite_path: default_sqlite_path(),
        }
    }
}

fn default_backend() -> StoreBackend {
    std::env::var("FORECAST_STORE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(StoreBackend::Postgres)
}

fn default_table() -> String {
    env_or("FORECAST_TABLE", "taokae_internal_data.demand_forecast")
}

fn default_key_column() -> String {
    env_or("FORECAST_KEY_COLUMN", "categorylv5")
}

fn default_sqlite_path() -> PathBuf {
    std::env::var("FORECAST_SQLITE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(crate::DATA_DIR_NAME)
                .join("forecasts.sqlite")
        })
}

/// PostgreSQL connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    #[serde(default = "default_pg_host")]
    pub host: String,

    #[serde(default = "default_pg_port")]
    pub port: u16,

    #[serde(default = "default_pg_user")]
    pub user: String,

    #[serde(default = "default_pg_password")]
    pub password: Option<String>,

    #[serde(default = "default_pg_dbname")]
    pub dbname: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: default_pg_host(),
            port: default_pg_port(),
            user: default_pg_user(),
            password: default_pg_password(),
            dbname: default_pg_dbname(),
        }
    }
}

fn default_pg_host() -> String {
    env_or("PG_HOST", "localhost")
}

fn default_pg_port() -> u16 {
    env_parse("PG_PORT").unwrap_or(5432)
}

fn default_pg_user() -> String {
    env_or("PG_USER", "postgres")
}

fn default_pg_password() -> Option<String> {
    env_non_empty("PG_PASSWORD")
}

fn default_pg_dbname() -> String {
    env_or("PG_DBNAME", "postgres")
}

/// How a run turns input into items and items into an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    /// Input is item names; the answer is a deterministic summary
    #[default]
    Direct,
    /// Free-text input goes through LLM extraction; the answer is synthesized
    Assisted,
}

impl FromStr for PipelineMode {
    type Err = ForecastAgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "assisted" => Ok(Self::Assisted),
            other => Err(ForecastAgentError::Config(format!(
                "Unknown pipeline mode: {}",
                other
            ))),
        }
    }
}

/// Orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_mode")]
    pub mode: PipelineMode,

    /// Items processed at once (1 = sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Directory with prompt overrides
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            concurrency: default_concurrency(),
            prompts_dir: default_prompts_dir(),
        }
    }
}

fn default_mode() -> PipelineMode {
    std::env::var("PIPELINE_MODE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

fn default_concurrency() -> usize {
    env_parse("CONCURRENCY").unwrap_or(1)
}

fn default_prompts_dir() -> Option<PathBuf> {
    env_non_empty("PROMPTS_DIR").map(PathBuf::from)
}

fn env_or(name: &str, default: &str) -> String {
    env_non_empty(name).unwrap_or_else(|| default.to_string())
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env_non_empty(name).and_then(|v| v.parse().ok())
}

/// Parse a dataset-id list from its environment form.
///
/// Accepts a JSON list (`["a", "b"]`) or a comma-separated list whose entries
/// may carry stray quotes (`a, "b", 'c'`).
pub fn parse_dataset_ids(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    if raw.starts_with('[') {
        if let Ok(serde_json::Value::Array(ids)) = serde_json::from_str::<serde_json::Value>(raw)
        {
            return ids
                .iter()
                .map(|id| match id {
                    serde_json::Value::String(s) => s.trim().to_string(),
                    other => other.to_string().trim().to_string(),
                })
                .filter(|id| !id.is_empty())
                .collect();
        }
    }

    raw.split(',')
        .map(|part| {
            part.trim()
                .trim_matches('"')
                .trim_matches('\'')
                .to_string()
        })
        .filter(|id| !id.is_empty())
        .collect()
}

impl Config {
    /// Load config from `FORECAST_AGENT_CONFIG` or the default path
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        Self::load_from(&path)
    }

    /// Load config from a file, falling back to environment defaults when absent
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            if content.trim().is_empty() {
                Config::default()
            } else {
                serde_yaml::from_str(&content)?
            }
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(ForecastAgentError::Config(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        if self.retrieval.timeout_secs == 0 {
            return Err(ForecastAgentError::Config(
                "retrieval.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.pipeline.concurrency == 0 {
            return Err(ForecastAgentError::Config(
                "pipeline.concurrency must be at least 1".to_string(),
            ));
        }
        // Interpolated into SQL, so they must be plain identifiers
        for (name, value) in [
            ("store.table", &self.store.table),
            ("store.key_column", &self.store.key_column),
        ] {
            if !SQL_IDENTIFIER.is_match(value) {
                return Err(ForecastAgentError::Config(format!(
                    "{} is not a valid SQL identifier: {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Copy with credentials masked, for display
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.llm.api_key.is_some() {
            config.llm.api_key = Some(REDACTED.to_string());
        }
        if config.retrieval.api_key.is_some() {
            config.retrieval.api_key = Some(REDACTED.to_string());
        }
        if config.store.postgres.password.is_some() {
            config.store.postgres.password = Some(REDACTED.to_string());
        }
        config
    }
}

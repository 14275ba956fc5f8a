//! Forecast Agent Core Library
//!
//! Resolves item names from user queries to precomputed demand forecasts.
//!
//! # Features
//! - LLM item extraction with schema-constrained output
//! - RAGFlow knowledge-base retrieval with a hard timeout and empty fallback
//! - LLM candidate selection over `header:value` catalog chunks
//! - Latest-forecast lookup in PostgreSQL or SQLite
//! - Deterministic summaries or LLM-synthesized answers

pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod retrieval;
pub mod store;

pub use config::{Config, LLMServiceConfig, PipelineMode, RetrievalConfig, StoreBackend, StoreConfig};
pub use error::{Error, ForecastAgentError, Result};
pub use llm::{ChatMessage, LLMClient, OpenAiClient, Prompts, Selection};
pub use pipeline::{
    normalize_input, ItemResult, Pipeline, PipelineComponents, PipelineInput, PipelineOptions,
    PipelineResult,
};
pub use retrieval::{Candidate, CandidateRetriever, KnowledgeBase, RagFlowClient, Retrieval};
pub use store::{open_store, ForecastRecord, ForecastStore, PostgresForecastStore, SqliteForecastStore};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "forecast-agent";

/// Default data directory name
pub const DATA_DIR_NAME: &str = "forecast-agent";

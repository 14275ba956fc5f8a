//! RAGFlow retrieval API client

use super::{Candidate, KnowledgeBase};
use crate::config::RetrievalConfig;
use crate::error::{ForecastAgentError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for `POST /api/v1/retrieval` scoped to a fixed dataset list
pub struct RagFlowClient {
    http_client: reqwest::Client,
    config: RetrievalConfig,
}

impl RagFlowClient {
    pub fn new(config: RetrievalConfig) -> Result<Self> {
        // The pipeline enforces its own deadline; this only guards against leaked sockets
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.saturating_mul(2)))
            .build()
            .map_err(ForecastAgentError::Http)?;

        if config.dataset_ids.is_empty() {
            tracing::warn!("No retrieval dataset ids configured; searches will return nothing");
        }

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(RetrievalConfig::default())
    }

    fn retrieval_url(&self) -> String {
        format!("{}/api/v1/retrieval", self.config.url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct RetrievalRequest<'a> {
    question: &'a str,
    dataset_ids: &'a [String],
    top_k: usize,
    page: usize,
    page_size: usize,
}

#[async_trait]
impl KnowledgeBase for RagFlowClient {
    async fn search(&self, question: &str, top_k: usize) -> Result<Vec<Candidate>> {
        if self.config.dataset_ids.is_empty() {
            return Ok(Vec::new());
        }

        let request = RetrievalRequest {
            question,
            dataset_ids: &self.config.dataset_ids,
            top_k,
            page: 1,
            page_size: top_k,
        };

        let mut req = self.http_client.post(self.retrieval_url()).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ForecastAgentError::ExternalError(format!(
                "Retrieval service error (HTTP {}): {}",
                status, body
            )));
        }

        let body: serde_json::Value = response.json().await?;
        parse_retrieval_response(&body)
    }

    fn name(&self) -> &str {
        "ragflow"
    }
}

/// Unwrap the `{code, message, data: {chunks}}` envelope into candidates
pub fn parse_retrieval_response(body: &serde_json::Value) -> Result<Vec<Candidate>> {
    #[derive(Deserialize)]
    struct Envelope {
        #[serde(default)]
        code: i64,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        data: Option<Data>,
    }

    #[derive(Deserialize)]
    struct Data {
        #[serde(default)]
        chunks: Vec<serde_json::Value>,
    }

    let envelope: Envelope = serde_json::from_value(body.clone()).map_err(|e| {
        ForecastAgentError::ExternalError(format!("Malformed retrieval response: {}", e))
    })?;

    if envelope.code != 0 {
        return Err(ForecastAgentError::ExternalError(format!(
            "Retrieval service returned code {}: {}",
            envelope.code,
            envelope.message.unwrap_or_default()
        )));
    }

    Ok(envelope
        .data
        .map(|data| data.chunks.iter().map(Candidate::from_json).collect())
        .unwrap_or_default())
}

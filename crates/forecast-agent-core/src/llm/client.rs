//! HTTP client for OpenAI-compatible chat-completion services

use crate::config::LLMServiceConfig;
use crate::error::{ForecastAgentError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Trait for LLM service clients
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a free-text chat completion
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String>;

    /// Generate a completion constrained to a JSON schema.
    ///
    /// Clients without native support fall back to a plain completion; the
    /// caller still validates the returned JSON.
    async fn structured_completion(
        &self,
        messages: Vec<ChatMessage>,
        _schema: &ResponseSchema,
    ) -> Result<String> {
        self.chat_completion(messages).await
    }

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Chat message for completion requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Named JSON schema for structured output
#[derive(Debug, Clone)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

impl ResponseSchema {
    pub fn new(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// OpenAI-compatible client (OpenAI, vLLM, Ollama, LiteLLM, ...)
pub struct OpenAiClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
}

impl OpenAiClient {
    /// Create new client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ForecastAgentError::Http)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(LLMServiceConfig::default())
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.url.trim_end_matches('/'))
    }

    async fn send(
        &self,
        messages: Vec<ChatMessage>,
        response_format: Option<serde_json::Value>,
    ) -> Result<String> {
        #[derive(Serialize)]
        struct ChatRequest {
            model: String,
            messages: Vec<ChatMessage>,
            temperature: f32,
            #[serde(skip_serializing_if = "Option::is_none")]
            max_tokens: Option<u32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            response_format: Option<serde_json::Value>,
        }

        let start = Instant::now();
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format,
        };

        let mut req = self.http_client.post(self.completions_url()).json(&request);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ForecastAgentError::ExternalError(format!(
                "LLM service error (HTTP {}): {}",
                status, body
            )));
        }

        let body: serde_json::Value = response.json().await?;
        let content = parse_chat_response(&body)?;

        tracing::debug!(
            model = %self.config.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "chat completion finished"
        );

        Ok(content)
    }
}

#[async_trait]
impl LLMClient for OpenAiClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.send(messages, None).await
    }

    async fn structured_completion(
        &self,
        messages: Vec<ChatMessage>,
        schema: &ResponseSchema,
    ) -> Result<String> {
        if !self.config.structured_output {
            return self.send(messages, None).await;
        }

        let response_format = serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema.name,
                "strict": true,
                "schema": schema.schema,
            }
        });
        self.send(messages, Some(response_format)).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Pull the first choice's message content out of a completion response
pub(crate) fn parse_chat_response(body: &serde_json::Value) -> Result<String> {
    #[derive(Deserialize)]
    struct ChatResponse {
        choices: Vec<ChatChoice>,
    }

    #[derive(Deserialize)]
    struct ChatChoice {
        message: ChoiceMessage,
    }

    #[derive(Deserialize)]
    struct ChoiceMessage {
        #[serde(default)]
        content: Option<String>,
    }

    let parsed: ChatResponse = serde_json::from_value(body.clone())
        .map_err(|e| ForecastAgentError::Llm(format!("Malformed completion response: {}", e)))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ForecastAgentError::Llm("No response from LLM".to_string()))
}

/// Extract a JSON object from a reply (handles markdown code fences and chatter)
pub(crate) fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&response[start..=end])
}

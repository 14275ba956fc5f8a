//! Turns a free-text query into item names with a schema-constrained completion

use super::client::extract_json_object;
use super::{ChatMessage, LLMClient, ResponseSchema};
use crate::error::{ForecastAgentError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Structured extraction result
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedItems {
    /// Item names extracted from the input text
    pub items: Vec<String>,
}

/// LLM-backed item extractor
pub struct ItemExtractor {
    client: Arc<dyn LLMClient>,
    instruction: String,
}

impl ItemExtractor {
    /// Create from LLM client and system instruction
    pub fn new(client: Arc<dyn LLMClient>, instruction: impl Into<String>) -> Self {
        Self {
            client,
            instruction: instruction.into(),
        }
    }

    /// Extract item names in the order the backend lists them.
    ///
    /// Blank entries are dropped; duplicates are kept. Backend errors propagate.
    pub async fn extract(&self, query: &str) -> Result<Vec<String>> {
        let messages = vec![
            ChatMessage::system(self.instruction.clone()),
            ChatMessage::user(format!("Extract items from this: {}", query)),
        ];

        let response = self
            .client
            .structured_completion(messages, &extracted_items_schema())
            .await?;

        let extracted = parse_extraction_response(&response)?;
        let items: Vec<String> = extracted
            .items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();

        tracing::debug!(count = items.len(), ?items, "extracted items");
        Ok(items)
    }
}

/// JSON schema for `{items: [string]}`
pub fn extracted_items_schema() -> ResponseSchema {
    ResponseSchema::new(
        "extracted_items",
        serde_json::json!({
            "type": "object",
            "properties": {
                "items": {
                    "type": "array",
                    "description": "List of item names extracted from the input text.",
                    "items": { "type": "string" }
                }
            },
            "required": ["items"],
            "additionalProperties": false
        }),
    )
}

fn parse_extraction_response(response: &str) -> Result<ExtractedItems> {
    let json_str = extract_json_object(response).ok_or_else(|| {
        ForecastAgentError::Llm(format!(
            "Extraction response is not a JSON object: {}",
            response
        ))
    })?;

    serde_json::from_str(json_str)
        .map_err(|e| ForecastAgentError::Llm(format!("Failed to parse extracted items: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extraction_response_plain() {
        let parsed = parse_extraction_response(r#"{"items": ["กระติกน้ำร้อน", "ตู้เตรียม"]}"#)
            .unwrap();
        assert_eq!(parsed.items, vec!["กระติกน้ำร้อน", "ตู้เตรียม"]);
    }

    #[test]
    fn test_parse_extraction_response_fenced() {
        let parsed = parse_extraction_response("```json\n{\"items\": []}\n```").unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn test_parse_extraction_response_wrong_shape() {
        assert!(parse_extraction_response(r#"{"item": "flap box"}"#).is_err());
        assert!(parse_extraction_response("flap box").is_err());
    }

    #[test]
    fn test_schema_requires_items() {
        let schema = extracted_items_schema();
        assert_eq!(schema.name, "extracted_items");
        assert_eq!(schema.schema["required"][0], "items");
    }
}

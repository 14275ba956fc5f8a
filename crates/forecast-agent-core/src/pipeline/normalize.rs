//! Input shapes accepted by the pipeline and their normalization to item names

use crate::error::{ForecastAgentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const INVALID_SHAPE: &str = "Invalid input format. Expected string or list.";

/// Raw pipeline input: one string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PipelineInput {
    Text(String),
    Items(Vec<String>),
}

impl PipelineInput {
    /// Accept a JSON string or an array of strings; reject every other shape
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(text) => Ok(Self::Text(text.clone())),
            serde_json::Value::Array(values) => values
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(Self::Items)
                .ok_or_else(|| ForecastAgentError::InvalidInput(INVALID_SHAPE.to_string())),
            _ => Err(ForecastAgentError::InvalidInput(INVALID_SHAPE.to_string())),
        }
    }
}

impl From<&str> for PipelineInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for PipelineInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<String>> for PipelineInput {
    fn from(items: Vec<String>) -> Self {
        Self::Items(items)
    }
}

impl fmt::Display for PipelineInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{}", text),
            Self::Items(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

/// Item names for a direct-mode run.
///
/// Text with a comma is split, trimmed and stripped of blank segments. Other
/// text is one item, trimmed; blank text yields nothing. Lists pass through
/// unchanged.
pub fn normalize_input(input: &PipelineInput) -> Vec<String> {
    match input {
        PipelineInput::Text(text) if text.contains(',') => text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        PipelineInput::Text(text) => {
            let item = text.trim();
            if item.is_empty() {
                Vec::new()
            } else {
                vec![item.to_string()]
            }
        }
        PipelineInput::Items(items) => items.clone(),
    }
}

//! Error types for the forecast agent

use thiserror::Error;

/// Result type alias using ForecastAgentError
pub type Result<T> = std::result::Result<T, ForecastAgentError>;

/// Error type alias for convenience
pub type Error = ForecastAgentError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for the forecast agent
#[derive(Debug, Error)]
pub enum ForecastAgentError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No items extracted from query: {0}")]
    NoItemsExtracted(String),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ForecastAgentError {
    /// True for failures caused by the caller's input rather than a backend
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::NoItemsExtracted(_))
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput(_) | Self::NoItemsExtracted(_) | Self::Config(_) => {
                exit_codes::INVALID_INPUT
            }
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_classified() {
        assert!(ForecastAgentError::InvalidInput("x".into()).is_input_error());
        assert!(ForecastAgentError::NoItemsExtracted("???".into()).is_input_error());
        assert!(!ForecastAgentError::Llm("down".into()).is_input_error());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            ForecastAgentError::NoItemsExtracted("q".into()).exit_code(),
            exit_codes::INVALID_INPUT
        );
        assert_eq!(
            ForecastAgentError::ExternalError("boom".into()).exit_code(),
            exit_codes::GENERAL_ERROR
        );
    }
}

//! Error types for TriageBuddy
//!
//! Generation and model-output failures are recovered inside the pipeline
//! stages; only request validation and processing failures reach callers.

use thiserror::Error;

/// Main error type for the triage pipeline
#[derive(Error, Debug)]
pub enum TriageError {
    /// Structurally invalid triage request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Text generation backend failed (network, HTTP status, empty body)
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Generated text could not be interpreted
    #[error("Malformed model output: {0}")]
    ModelOutput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected failure while running the pipeline
    #[error("Processing failed: {0}")]
    Processing(String),
}

impl TriageError {
    /// Whether the error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(self, TriageError::InvalidRequest(_))
    }
}

/// Result type alias for triage operations
pub type Result<T> = std::result::Result<T, TriageError>;

/// Convert anyhow errors to TriageError
impl From<anyhow::Error> for TriageError {
    fn from(err: anyhow::Error) -> Self {
        TriageError::Processing(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TriageError::InvalidRequest("ticket.id must not be empty".to_string());
        assert!(err.to_string().contains("ticket.id"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_processing_error_not_client_error() {
        let err = TriageError::Processing("boom".to_string());
        assert!(!err.is_client_error());
        assert!(err.to_string().starts_with("Processing failed"));
    }

    #[test]
    fn test_from_anyhow() {
        let err: TriageError = anyhow::anyhow!("context lost").into();
        assert!(matches!(err, TriageError::Processing(_)));
    }
}

//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during LLM operations
///
/// A timeout is its own variant so callers can distinguish "the model was
/// slow" from transport faults when rendering the degraded reply.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key not available: {0}")]
    MissingApiKey(String),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Classify a reqwest error, splitting timeouts out from other faults
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(timeout)
        } else {
            LlmError::Network(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = LlmError::ApiError {
            status: 401,
            message: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "API error 401: bad key");
    }

    #[test]
    fn test_timeout_display_names_duration() {
        let err = LlmError::Timeout(Duration::from_secs(30));
        assert!(err.to_string().contains("30s"));
    }
}

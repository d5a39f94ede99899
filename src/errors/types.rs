use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BugtraceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed with status {code}: {message}")]
    HttpStatus { code: u16, message: String },

    #[error("Received an empty response from the AI. The model may have filtered or refused the request.")]
    EmptyResponse,

    #[error("Circuit breaker active due to repeated failures. Please wait {:.1}s.", remaining.as_secs_f64())]
    CircuitOpen { remaining: Duration },

    #[error("Request cancelled.")]
    Cancelled,

    #[error("Failed to parse the model's JSON response: {0}")]
    Parse(String),

    #[error("Failed to parse the model's JSON response, even after a self-correction attempt: {0}")]
    UnrecoverableParse(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BugtraceError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BugtraceError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_open_message_shows_remaining_seconds() {
        let err = BugtraceError::CircuitOpen { remaining: Duration::from_millis(12_340) };
        assert_eq!(
            err.to_string(),
            "Circuit breaker active due to repeated failures. Please wait 12.3s."
        );
    }

    #[test]
    fn test_http_status_message() {
        let err = BugtraceError::HttpStatus { code: 429, message: "Rate limit exceeded".into() };
        assert_eq!(err.to_string(), "API request failed with status 429: Rate limit exceeded");
    }

    #[test]
    fn test_only_cancelled_is_cancelled() {
        assert!(BugtraceError::Cancelled.is_cancelled());
        assert!(!BugtraceError::EmptyResponse.is_cancelled());
        assert!(!BugtraceError::Network("reset".into()).is_cancelled());
    }
}

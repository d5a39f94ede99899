use super::types::BugtraceError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    /// Whether a call ending with this error feeds the circuit breaker.
    pub counts_as_failure: bool,
}

impl BugtraceError {
    /// Classify this error for structured logging and circuit-breaker accounting.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Transport failures
            BugtraceError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                counts_as_failure: true,
            },
            BugtraceError::HttpStatus { .. } => ErrorClassification {
                error_type: "HttpStatusError",
                counts_as_failure: true,
            },
            BugtraceError::EmptyResponse => ErrorClassification {
                error_type: "EmptyResponseError",
                counts_as_failure: true,
            },

            // Parsing
            BugtraceError::Parse(_) => ErrorClassification {
                error_type: "ParseError",
                counts_as_failure: true,
            },
            BugtraceError::UnrecoverableParse(_) => ErrorClassification {
                error_type: "UnrecoverableParseError",
                counts_as_failure: true,
            },
            BugtraceError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                counts_as_failure: true,
            },

            // The breaker rejected the call before dispatch; nothing was attempted.
            BugtraceError::CircuitOpen { .. } => ErrorClassification {
                error_type: "CircuitOpenError",
                counts_as_failure: false,
            },
            BugtraceError::Cancelled => ErrorClassification {
                error_type: "Cancelled",
                counts_as_failure: false,
            },

            BugtraceError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                counts_as_failure: false,
            },
            BugtraceError::Prompt(_) => ErrorClassification {
                error_type: "PromptError",
                counts_as_failure: false,
            },
            BugtraceError::Io(_) => ErrorClassification {
                error_type: "IoError",
                counts_as_failure: false,
            },
            BugtraceError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                counts_as_failure: false,
            },
            BugtraceError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                counts_as_failure: true,
            },
        }
    }
}

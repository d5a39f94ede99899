use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::errors::BugtraceError;
use crate::llm::Caller;
use crate::prompts::PromptCatalog;
use super::extract::extract_json;

/// Corrective calls allowed per parse. Fixed; there is no retry loop.
pub const MAX_PARSE_CORRECTIONS: u32 = 1;

/// Result of one parse step.
#[derive(Debug)]
pub enum ParseOutcome<T> {
    Parsed(T),
    /// Worth one corrective call.
    ParseFailed { error: String },
    /// Correction already spent.
    Unrecoverable { error: String },
}

impl<T> ParseOutcome<T> {
    /// Mark a failure as final.
    pub fn escalate(self) -> Self {
        match self {
            ParseOutcome::ParseFailed { error } => ParseOutcome::Unrecoverable { error },
            other => other,
        }
    }

    pub fn into_result(self) -> Result<T, BugtraceError> {
        match self {
            ParseOutcome::Parsed(value) => Ok(value),
            ParseOutcome::ParseFailed { error } => Err(BugtraceError::Parse(error)),
            ParseOutcome::Unrecoverable { error } => Err(BugtraceError::UnrecoverableParse(error)),
        }
    }
}

/// Deserialize the JSON found in `text`, or `text` itself when no JSON span
/// can be located. Never calls the model.
pub fn try_parse<T: DeserializeOwned>(text: &str) -> ParseOutcome<T> {
    let candidate = extract_json(text).unwrap_or(text);
    match serde_json::from_str::<T>(candidate) {
        Ok(value) => ParseOutcome::Parsed(value),
        Err(e) => ParseOutcome::ParseFailed { error: e.to_string() },
    }
}

/// Parse a model reply, spending at most one corrective call on failure.
///
/// Errors raised by the corrective call itself (transport, circuit open,
/// cancellation) are returned unchanged.
pub async fn parse_with_correction<T: DeserializeOwned>(
    raw: &str,
    original_prompt: &str,
    caller: &Caller,
    prompts: &dyn PromptCatalog,
) -> Result<T, BugtraceError> {
    let error = match try_parse::<T>(raw) {
        ParseOutcome::ParseFailed { error } => error,
        outcome => return outcome.into_result(),
    };

    warn!(error = %error, raw_len = raw.len(), "Malformed JSON detected, attempting self-correction");
    let fix_prompt = prompts.correction_prompt(original_prompt, raw, &error);
    let corrected = caller.invoke(&fix_prompt, true).await?;

    match try_parse::<T>(&corrected).escalate() {
        ParseOutcome::Parsed(value) => {
            debug!("Self-correction produced valid JSON");
            Ok(value)
        }
        outcome => {
            error!(corrected_len = corrected.len(), "Self-correction failed, response still invalid");
            outcome.into_result()
        }
    }
}

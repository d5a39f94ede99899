use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use crate::errors::BugtraceError;
use super::types::LLMResponse;

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Single-turn completion. `json_mode` asks the endpoint to constrain the
    /// reply to a JSON object. Implementations should stop as soon as `cancel`
    /// fires and report `BugtraceError::Cancelled`.
    async fn complete(
        &self,
        prompt: &str,
        json_mode: bool,
        cancel: &CancellationToken,
    ) -> Result<LLMResponse, BugtraceError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;

    /// Model identifier
    fn model_name(&self) -> &str;
}

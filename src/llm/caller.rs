use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::BugtraceError;
use crate::lifecycle::{CallOutcome, RequestLifecycle};
use super::provider::LLMProvider;

/// Dispatches prompts to a provider through the shared request lifecycle.
///
/// Every call waits for its rate-limit slot, passes the circuit breaker,
/// registers a fresh cancellation scope and reports its outcome back.
/// A cancelled run token stops the call at any of those steps.
#[derive(Clone)]
pub struct Caller {
    provider: Arc<dyn LLMProvider>,
    lifecycle: Arc<RequestLifecycle>,
    run_token: CancellationToken,
}

impl Caller {
    pub fn new(provider: Arc<dyn LLMProvider>, lifecycle: Arc<RequestLifecycle>) -> Self {
        Self { provider, lifecycle, run_token: CancellationToken::new() }
    }

    /// Bind the caller to a run, so cancelling `token` also refuses new calls.
    pub fn with_run_token(mut self, token: CancellationToken) -> Self {
        self.run_token = token;
        self
    }

    pub fn run_token(&self) -> &CancellationToken {
        &self.run_token
    }

    pub fn lifecycle(&self) -> &Arc<RequestLifecycle> {
        &self.lifecycle
    }

    pub fn provider(&self) -> &dyn LLMProvider {
        self.provider.as_ref()
    }

    /// Send one prompt and return the raw reply text.
    pub async fn invoke(&self, prompt: &str, json_mode: bool) -> Result<String, BugtraceError> {
        tokio::select! {
            biased;
            _ = self.run_token.cancelled() => {
                debug!("Run cancelled while waiting for a rate limit slot");
                return Err(BugtraceError::Cancelled);
            }
            _ = self.lifecycle.await_rate_limit_slot() => {}
        }

        let scope = self.lifecycle.begin_call().await?;
        if self.run_token.is_cancelled() {
            self.lifecycle.end_call(&scope, CallOutcome::Cancelled).await;
            return Err(BugtraceError::Cancelled);
        }
        self.lifecycle.record_dispatch().await;

        debug!(
            provider = self.provider.provider_name(),
            model = self.provider.model_name(),
            generation = scope.generation(),
            prompt_len = prompt.len(),
            json_mode,
            "Dispatching model call"
        );

        let result = tokio::select! {
            biased;
            _ = scope.token().cancelled() => Err(BugtraceError::Cancelled),
            _ = self.run_token.cancelled() => {
                scope.cancel();
                Err(BugtraceError::Cancelled)
            }
            resp = self.provider.complete(prompt, json_mode, scope.token()) => resp,
        };

        let outcome = match &result {
            Ok(_) => CallOutcome::Success,
            Err(e) if e.is_cancelled() => CallOutcome::Cancelled,
            Err(e) => {
                let class = e.classify();
                warn!(error_type = class.error_type, error = %e, "Model call failed");
                if class.counts_as_failure { CallOutcome::Failure } else { CallOutcome::Cancelled }
            }
        };
        self.lifecycle.end_call(&scope, outcome).await;

        result.map(|resp| resp.content)
    }
}

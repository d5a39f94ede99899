use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use crate::config::credentials::redact_credentials;
use crate::errors::BugtraceError;
use super::provider::LLMProvider;
use super::types::{ApiOptions, LLMResponse, Message};

pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Chat-completions client for OpenRouter and OpenAI-compatible endpoints.
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenRouterProvider {
    pub fn new(options: &ApiOptions) -> Result<Self, BugtraceError> {
        if options.api_key.trim().is_empty() {
            return Err(BugtraceError::Config("API Key is not configured.".into()));
        }
        let mut builder = Client::builder();
        if let Some(secs) = options.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| BugtraceError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: options.api_key.clone(),
            model: options.model.clone(),
            endpoint: options.base_url.clone().unwrap_or_else(|| OPENROUTER_API_URL.to_string()),
        })
    }

    fn request_body(&self, prompt: &str, json_mode: bool) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [Message::user(prompt)],
        });
        if json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }

    /// Strip the API key from error text before it reaches logs or the step log.
    fn scrub(&self, err: BugtraceError) -> BugtraceError {
        let secrets = [self.api_key.as_str()];
        match err {
            BugtraceError::Network(msg) => BugtraceError::Network(redact_credentials(&msg, &secrets)),
            BugtraceError::HttpStatus { code, message } => BugtraceError::HttpStatus {
                code,
                message: redact_credentials(&message, &secrets),
            },
            other => other,
        }
    }

    async fn send(
        &self,
        prompt: &str,
        json_mode: bool,
        cancel: &CancellationToken,
    ) -> Result<LLMResponse, BugtraceError> {
        let request = self.client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", "https://github.com/yz9yt/BugTrace-AI")
            .json(&self.request_body(prompt, json_mode))
            .send();

        let resp = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(BugtraceError::Cancelled),
            resp = request => resp
                .map_err(|e| BugtraceError::Network(format!("OpenRouter request failed: {}", e)))?,
        };

        let status = resp.status();
        let data: Value = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(BugtraceError::Cancelled),
            body = resp.json::<Value>() => match body {
                Ok(v) => v,
                Err(e) if status.is_success() => {
                    return Err(BugtraceError::Network(format!("Failed to read response body: {}", e)));
                }
                Err(_) => Value::Null,
            },
        };

        if !status.is_success() {
            return Err(http_error(status.as_u16(), &data));
        }
        parse_completion(&data, &self.model)
    }
}

#[async_trait]
impl LLMProvider for OpenRouterProvider {
    async fn complete(
        &self,
        prompt: &str,
        json_mode: bool,
        cancel: &CancellationToken,
    ) -> Result<LLMResponse, BugtraceError> {
        self.send(prompt, json_mode, cancel).await.map_err(|e| self.scrub(e))
    }

    fn provider_name(&self) -> &str { "openrouter" }
    fn model_name(&self) -> &str { &self.model }
}

fn http_error(code: u16, data: &Value) -> BugtraceError {
    let message = data["error"]["message"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| format!("API request failed with status {}", code));
    BugtraceError::HttpStatus { code, message }
}

/// Pull the assistant text out of a chat-completions response body.
pub(crate) fn parse_completion(data: &Value, model: &str) -> Result<LLMResponse, BugtraceError> {
    // OpenRouter can report upstream errors inside a 200 response.
    if let Some(Value::Object(error)) = data.get("error") {
        let code = error
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(502);
        return Err(http_error(code, data));
    }

    let content = data["choices"][0]["message"]["content"]
        .as_str()
        .filter(|c| !c.trim().is_empty())
        .ok_or(BugtraceError::EmptyResponse)?
        .to_string();

    Ok(LLMResponse {
        content,
        input_tokens: data["usage"]["prompt_tokens"].as_u64(),
        output_tokens: data["usage"]["completion_tokens"].as_u64(),
        model: data["model"].as_str().unwrap_or(model).to_string(),
    })
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: &str) -> Self {
        Self { role: "user".to_string(), content: content.to_string() }
    }
}

/// Connection settings handed to a provider.
#[derive(Debug, Clone)]
pub struct ApiOptions {
    pub api_key: String,
    pub model: String,
    /// Chat-completions endpoint; the OpenRouter URL when unset.
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ApiOptions {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: None,
            timeout_secs: None,
        }
    }
}

pub struct ModelInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub recommended: bool,
}

pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

/// Fallback list shown when the live model listing is unavailable.
pub static OPENROUTER_MODELS: &[ModelInfo] = &[
    ModelInfo { id: "google/gemini-2.5-flash", label: "Gemini 2.5 Flash", recommended: true },
    ModelInfo { id: "anthropic/claude-3.5-sonnet", label: "Claude 3.5 Sonnet", recommended: false },
    ModelInfo { id: "openai/gpt-4o", label: "GPT-4o", recommended: false },
    ModelInfo { id: "mistralai/mistral-large", label: "Mistral Large", recommended: false },
    ModelInfo { id: "openai/gpt-3.5-turbo", label: "GPT-3.5 Turbo", recommended: false },
];

pub fn get_model(id: &str) -> Option<&'static ModelInfo> {
    OPENROUTER_MODELS.iter().find(|m| m.id == id)
}

/// OpenRouter keys start with `sk-or-`. Only used to warn early.
pub fn looks_like_openrouter_key(key: &str) -> bool {
    key.trim().starts_with("sk-or-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_is_listed_and_recommended() {
        let model = get_model(DEFAULT_MODEL).unwrap();
        assert!(model.recommended);
    }

    #[test]
    fn test_exactly_one_recommended_model() {
        assert_eq!(OPENROUTER_MODELS.iter().filter(|m| m.recommended).count(), 1);
    }

    #[test]
    fn test_key_format() {
        assert!(looks_like_openrouter_key("sk-or-v1-abc"));
        assert!(!looks_like_openrouter_key("sk-ant-abc"));
        assert!(!looks_like_openrouter_key(""));
    }
}

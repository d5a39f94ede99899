use crate::errors::BugtraceError;
use super::provider::LLMProvider;
use super::openrouter::OpenRouterProvider;
use super::types::ApiOptions;

pub fn create_provider(
    provider_name: &str,
    options: &ApiOptions,
) -> Result<Box<dyn LLMProvider>, BugtraceError> {
    match provider_name {
        "openrouter" => Ok(Box::new(OpenRouterProvider::new(options)?)),
        "openai_compatible" => {
            if options.base_url.is_none() {
                return Err(BugtraceError::Config(
                    "openai_compatible provider requires llm.base_url".into(),
                ));
            }
            Ok(Box::new(OpenRouterProvider::new(options)?))
        }
        _ => Err(BugtraceError::Config(format!("Unknown LLM provider: {}", provider_name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openrouter_provider() {
        let provider = create_provider("openrouter", &ApiOptions::new("sk-or-test", "openai/gpt-4o")).unwrap();
        assert_eq!(provider.provider_name(), "openrouter");
        assert_eq!(provider.model_name(), "openai/gpt-4o");
    }

    #[test]
    fn test_openai_compatible_needs_base_url() {
        let options = ApiOptions::new("key", "local-model");
        assert!(create_provider("openai_compatible", &options).is_err());

        let mut options = options;
        options.base_url = Some("http://localhost:11434/v1/chat/completions".into());
        assert!(create_provider("openai_compatible", &options).is_ok());
    }

    #[test]
    fn test_unknown_provider() {
        let err = create_provider("carrier-pigeon", &ApiOptions::new("k", "m")).err().unwrap();
        assert!(matches!(err, BugtraceError::Config(_)));
    }
}

use std::path::Path;
use crate::errors::BugtraceError;
use crate::llm::catalog::looks_like_openrouter_key;
use super::types::BugtraceConfig;
use super::schema::CONFIG_SCHEMA;
use tracing::warn;

const MAX_CONFIG_BYTES: u64 = 1_048_576;

pub async fn parse_config(path: &Path) -> Result<BugtraceConfig, BugtraceError> {
    if !path.exists() {
        return Err(BugtraceError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(BugtraceError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

/// Parse and validate configuration from YAML text.
pub fn parse_config_str(content: &str) -> Result<BugtraceConfig, BugtraceError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    // An empty file is a valid, all-defaults config.
    if yaml.is_null() {
        return Ok(BugtraceConfig::default());
    }

    for warning in schema_warnings(&yaml)? {
        warn!(validation_error = %warning, "Config schema warning");
    }

    let config: BugtraceConfig = serde_yaml::from_value(yaml)?;
    validate_semantics(&config)?;
    Ok(config)
}

/// Validate config against the JSON schema. Violations are advisory and
/// returned as messages rather than errors.
pub fn schema_warnings(yaml: &serde_yaml::Value) -> Result<Vec<String>, BugtraceError> {
    let json_value = serde_json::to_value(yaml)
        .map_err(|e| BugtraceError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| BugtraceError::Config(format!("Schema compilation error: {}", e)))?;

    let messages = match compiled.validate(&json_value) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.map(|e| format!("{} at {}", e, e.instance_path)).collect(),
    };
    Ok(messages)
}

/// Reject values the pipeline cannot run with.
fn validate_semantics(config: &BugtraceConfig) -> Result<(), BugtraceError> {
    if let Some(analysis) = &config.analysis {
        if analysis.depth == Some(0) {
            return Err(BugtraceError::Config("analysis.depth must be at least 1".into()));
        }
    }

    if let Some(lifecycle) = &config.lifecycle {
        if lifecycle.max_failures == Some(0) {
            return Err(BugtraceError::Config("lifecycle.max_failures must be at least 1".into()));
        }
    }

    if let Some(llm) = &config.llm {
        let provider = config.provider();
        if provider == "openai_compatible" && llm.base_url.is_none() {
            return Err(BugtraceError::Config(
                "llm.base_url is required for the openai_compatible provider".into(),
            ));
        }
        if provider == "openrouter" {
            if let Some(key) = llm.api_key.as_deref().filter(|k| !k.starts_with('$')) {
                if !looks_like_openrouter_key(key) {
                    warn!("llm.api_key does not look like an OpenRouter key (expected an sk-or- prefix)");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ScanMode;

    #[test]
    fn test_full_config() {
        let config = parse_config_str(
            r#"
llm:
  provider: openrouter
  model: openai/gpt-4o
  api_key: sk-or-v1-test
lifecycle:
  min_interval_ms: 750
  max_failures: 5
analysis:
  depth: 4
  mode: greybox
  deep_analysis: true
output:
  format: json
"#,
        )
        .unwrap();
        assert_eq!(config.model(), "openai/gpt-4o");
        assert_eq!(config.depth(), 4);
        assert_eq!(config.mode(), ScanMode::Greybox);
        assert!(config.deep_analysis());
        assert_eq!(config.lifecycle_config().max_failures, 5);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = parse_config_str("").unwrap();
        assert_eq!(config.depth(), 3);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let err = parse_config_str("analysis:\n  depth: 0\n").unwrap_err();
        assert!(matches!(err, BugtraceError::Config(_)));
    }

    #[test]
    fn test_openai_compatible_requires_base_url() {
        let err = parse_config_str("llm:\n  provider: openai_compatible\n").unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_unknown_mode_is_a_parse_error() {
        assert!(parse_config_str("analysis:\n  mode: fuzz\n").is_err());
    }

    #[test]
    fn test_schema_warnings_are_advisory() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("analysis:\n  depth: 25\nextra: 1\n").unwrap();
        let warnings = schema_warnings(&yaml).unwrap();
        assert_eq!(warnings.len(), 2);
        // Still parses: depth 25 is unusual but runnable.
        assert_eq!(parse_config_str("analysis:\n  depth: 25\n").unwrap().depth(), 25);
    }
}

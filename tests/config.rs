use std::fs;

use bugtrace::config::parse_config;
use bugtrace::errors::BugtraceError;
use bugtrace::pipeline::ScanMode;
use bugtrace::reporting::ExportFormat;

#[tokio::test]
async fn test_parse_full_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bugtrace.yaml");
    fs::write(
        &path,
        r#"
llm:
  provider: openrouter
  model: openai/gpt-4o
  api_key: sk-or-test
lifecycle:
  min_interval_ms: 1000
  max_failures: 5
  cooldown_secs: 60
analysis:
  depth: 4
  mode: recon
  validate: false
  deep_analysis: true
output:
  directory: ./out
  format: json
"#,
    )
    .unwrap();

    let config = parse_config(&path).await.unwrap();
    assert_eq!(config.model(), "openai/gpt-4o");
    assert_eq!(config.depth(), 4);
    assert_eq!(config.mode(), ScanMode::Recon);
    assert!(!config.validate_findings());
    assert!(config.deep_analysis());
    assert_eq!(config.output_format(), ExportFormat::Json);

    let lifecycle = config.lifecycle_config();
    assert_eq!(lifecycle.max_failures, 5);
    assert_eq!(lifecycle.cooldown.as_secs(), 60);
    assert_eq!(lifecycle.min_interval.as_millis(), 1000);
}

#[tokio::test]
async fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = parse_config(&dir.path().join("absent.yaml")).await.unwrap_err();
    assert!(matches!(err, BugtraceError::Config(_)));
}

#[tokio::test]
async fn test_zero_depth_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "analysis:\n  depth: 0\n").unwrap();
    assert!(matches!(parse_config(&path).await, Err(BugtraceError::Config(_))));
}

#[tokio::test]
async fn test_empty_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.yaml");
    fs::write(&path, "").unwrap();
    let config = parse_config(&path).await.unwrap();
    assert_eq!(config.depth(), 3);
    assert_eq!(config.mode(), ScanMode::Active);
}

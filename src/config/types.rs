use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lifecycle::{LifecycleConfig, DEFAULT_COOLDOWN, DEFAULT_MAX_FAILURES, DEFAULT_MIN_INTERVAL};
use crate::llm::catalog::DEFAULT_MODEL;
use crate::pipeline::ScanMode;
use crate::reporting::ExportFormat;
use super::credentials::resolve_credential;

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const DEFAULT_PROVIDER: &str = "openrouter";
pub const DEFAULT_DEPTH: u32 = 3;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BugtraceConfig {
    pub llm: Option<LLMConfig>,
    pub lifecycle: Option<LifecycleSettings>,
    pub analysis: Option<AnalysisConfig>,
    pub prompts: Option<PromptsConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LLMConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    /// Literal key or `$ENV_VAR` reference.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LifecycleSettings {
    pub min_interval_ms: Option<u64>,
    pub max_failures: Option<u32>,
    pub cooldown_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AnalysisConfig {
    pub depth: Option<u32>,
    pub mode: Option<ScanMode>,
    pub validate: Option<bool>,
    pub deep_analysis: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PromptsConfig {
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct OutputConfig {
    pub directory: Option<PathBuf>,
    pub format: Option<ExportFormat>,
}

impl BugtraceConfig {
    pub fn provider(&self) -> String {
        self.llm
            .as_ref()
            .and_then(|l| l.provider.clone())
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string())
    }

    pub fn model(&self) -> String {
        self.llm
            .as_ref()
            .and_then(|l| l.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    /// The configured key (with `$VAR` references resolved), else the
    /// `OPENROUTER_API_KEY` environment variable.
    pub fn api_key(&self) -> Option<String> {
        self.llm
            .as_ref()
            .and_then(|l| l.api_key.as_deref())
            .map(resolve_credential)
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()))
    }

    pub fn lifecycle_config(&self) -> LifecycleConfig {
        let settings = self.lifecycle.clone().unwrap_or_default();
        LifecycleConfig {
            min_interval: settings
                .min_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_MIN_INTERVAL),
            max_failures: settings.max_failures.unwrap_or(DEFAULT_MAX_FAILURES),
            cooldown: settings
                .cooldown_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_COOLDOWN),
        }
    }

    pub fn depth(&self) -> u32 {
        self.analysis.as_ref().and_then(|a| a.depth).unwrap_or(DEFAULT_DEPTH)
    }

    pub fn mode(&self) -> ScanMode {
        self.analysis.as_ref().and_then(|a| a.mode).unwrap_or_default()
    }

    pub fn validate_findings(&self) -> bool {
        self.analysis.as_ref().and_then(|a| a.validate).unwrap_or(true)
    }

    pub fn deep_analysis(&self) -> bool {
        self.analysis.as_ref().and_then(|a| a.deep_analysis).unwrap_or(false)
    }

    pub fn prompts_dir(&self) -> Option<PathBuf> {
        self.prompts.as_ref().and_then(|p| p.directory.clone())
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output
            .as_ref()
            .and_then(|o| o.directory.clone())
            .unwrap_or_else(|| PathBuf::from("./reports"))
    }

    pub fn output_format(&self) -> ExportFormat {
        self.output.as_ref().and_then(|o| o.format).unwrap_or_default()
    }
}

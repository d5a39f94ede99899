use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::BugtraceError;
use crate::models::{AnalysisAttempt, Report};

/// What kind of target is analyzed and with which methodology.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Passive reconnaissance of a URL from public information.
    Recon,
    /// Simulated active scan of a URL.
    #[default]
    Active,
    /// Active scan correlated with client-side code analysis.
    Greybox,
    /// Static analysis of a source snippet.
    Code,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recon => "recon",
            Self::Active => "active",
            Self::Greybox => "greybox",
            Self::Code => "code",
        }
    }

    /// Code scans request strict JSON; URL scans let the model answer freely
    /// and the JSON is extracted from the reply.
    pub fn uses_json_mode(&self) -> bool {
        matches!(self, Self::Code)
    }

    pub fn is_url_scan(&self) -> bool {
        !matches!(self, Self::Code)
    }
}

impl std::fmt::Display for ScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScanMode {
    type Err = BugtraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recon" => Ok(Self::Recon),
            "active" => Ok(Self::Active),
            "greybox" | "grey-box" => Ok(Self::Greybox),
            "code" | "sast" => Ok(Self::Code),
            other => Err(BugtraceError::Config(format!(
                "Unknown scan mode '{}'. Expected one of: recon, active, greybox, code",
                other
            ))),
        }
    }
}

/// The thing being analyzed: a URL for the URL modes, source text for `Code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisInput {
    pub target: String,
    pub mode: ScanMode,
}

impl AnalysisInput {
    pub fn new(target: impl Into<String>, mode: ScanMode) -> Self {
        Self { target: target.into(), mode }
    }

    /// The target recorded on the report when the model leaves it empty.
    pub fn report_target(&self) -> &str {
        match self.mode {
            ScanMode::Code => "Analyzed Code Snippet",
            _ => &self.target,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub input: AnalysisInput,
    /// Number of independent scan attempts. Values below 1 are treated as 1.
    pub depth: u32,
    pub validate: bool,
    pub deep_analysis: bool,
}

impl AnalysisRequest {
    pub fn new(input: AnalysisInput, depth: u32) -> Self {
        Self { input, depth, validate: true, deep_analysis: false }
    }

    pub fn effective_depth(&self) -> u32 {
        self.depth.max(1)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStage {
    Scanning,
    Consolidating,
    Validating,
    DeepAnalyzing,
    Done,
    Failed,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scanning => write!(f, "scanning"),
            Self::Consolidating => write!(f, "consolidating"),
            Self::Validating => write!(f, "validating"),
            Self::DeepAnalyzing => write!(f, "deep-analyzing"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub attempts_succeeded: u32,
    pub attempts_failed: u32,
    pub findings_filtered: u32,
    pub findings_enriched: u32,
    /// Model calls dispatched during this run, corrective calls included.
    pub calls_dispatched: u64,
    pub elapsed_ms: u64,
}

impl RunStats {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Everything a successful run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub report: Report,
    pub steps: Vec<String>,
    pub attempts: Vec<AnalysisAttempt>,
    pub stats: RunStats,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("All {} analysis attempts failed: {}", failures.len(), failures.join("; "))]
    AllAttemptsFailed { failures: Vec<String> },

    #[error("Failed to consolidate reports: {0}")]
    Consolidation(BugtraceError),

    #[error("Analysis cancelled during {stage}")]
    Cancelled { stage: PipelineStage },
}

impl PipelineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_mode_parsing() {
        assert_eq!("recon".parse::<ScanMode>().unwrap(), ScanMode::Recon);
        assert_eq!("GreyBox".parse::<ScanMode>().unwrap(), ScanMode::Greybox);
        assert_eq!("sast".parse::<ScanMode>().unwrap(), ScanMode::Code);
        assert!("fuzz".parse::<ScanMode>().is_err());
    }

    #[test]
    fn test_only_code_scans_use_json_mode() {
        assert!(ScanMode::Code.uses_json_mode());
        for mode in [ScanMode::Recon, ScanMode::Active, ScanMode::Greybox] {
            assert!(!mode.uses_json_mode());
            assert!(mode.is_url_scan());
        }
    }

    #[test]
    fn test_depth_is_at_least_one() {
        let input = AnalysisInput::new("https://example.com", ScanMode::Active);
        assert_eq!(AnalysisRequest::new(input.clone(), 0).effective_depth(), 1);
        assert_eq!(AnalysisRequest::new(input, 4).effective_depth(), 4);
    }

    #[test]
    fn test_code_report_target() {
        let input = AnalysisInput::new("fn main() {}", ScanMode::Code);
        assert_eq!(input.report_target(), "Analyzed Code Snippet");
        let input = AnalysisInput::new("https://example.com", ScanMode::Recon);
        assert_eq!(input.report_target(), "https://example.com");
    }

    #[test]
    fn test_all_attempts_failed_message() {
        let err = PipelineError::AllAttemptsFailed {
            failures: vec!["Run 1: timeout".into(), "Run 2: 500".into()],
        };
        assert_eq!(err.to_string(), "All 2 analysis attempts failed: Run 1: timeout; Run 2: 500");
    }
}

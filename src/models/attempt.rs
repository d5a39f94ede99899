use super::finding::Finding;
use super::report::Report;

/// The outcome of one independent analysis pass over the input.
#[derive(Debug, Clone)]
pub struct AnalysisAttempt {
    /// Zero-based iteration index; also selects the prompt variant.
    pub index: u32,
    pub report: Option<Report>,
    pub error: Option<String>,
}

impl AnalysisAttempt {
    pub fn succeeded(index: u32, report: Report) -> Self {
        Self { index, report: Some(report), error: None }
    }

    pub fn failed(index: u32, error: impl Into<String>) -> Self {
        Self { index, report: None, error: Some(error.into()) }
    }

    pub fn is_success(&self) -> bool {
        self.report.is_some()
    }

    /// One-based run number as shown in the step log.
    pub fn run_number(&self) -> u32 {
        self.index + 1
    }

    pub fn findings(&self) -> &[Finding] {
        self.report.as_ref().map(|r| r.findings.as_slice()).unwrap_or(&[])
    }
}

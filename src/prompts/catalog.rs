use crate::models::Finding;
use crate::pipeline::AnalysisInput;

/// Produces the text of every prompt the pipeline sends.
///
/// Implementations must be deterministic for a given argument set; the
/// pipeline relies on `scan_prompt` varying only through `iteration`.
pub trait PromptCatalog: Send + Sync {
    fn scan_prompt(&self, input: &AnalysisInput, iteration: u32) -> String;

    /// `reports_json` is a JSON array of the successful attempt reports.
    fn consolidation_prompt(&self, reports_json: &str) -> String;

    fn validation_prompt(&self, finding: &Finding) -> String;

    fn deep_analysis_prompt(&self, finding: &Finding, input: &AnalysisInput) -> String;

    fn correction_prompt(&self, original_prompt: &str, malformed: &str, error: &str) -> String;
}

use crate::models::Severity;
use super::state::PipelineStage;

/// Messages streamed from a running pipeline to a live consumer.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    PipelineStarted {
        target: String,
        mode: String,
        depth: u32,
    },
    /// A stage has begun. `Done` and `Failed` are announced the same way.
    StageStarted {
        stage: PipelineStage,
        display_name: String,
        description: String,
    },
    /// One line of the human-readable step log
    Step {
        message: String,
    },
    FindingDiscovered {
        name: String,
        severity: Severity,
    },
    PipelineCompleted {
        total_findings: usize,
        total_calls: u64,
        total_duration_ms: u64,
    },
    PipelineFailed {
        error: String,
    },
}

use thiserror::Error;

use crate::errors::BugtraceError;
use crate::pipeline::PipelineError;

/// Everything a command handler can fail with.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Bugtrace(#[from] BugtraceError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Bugtrace(e) | CliError::Pipeline(PipelineError::Consolidation(e)) => match e {
                BugtraceError::Config(_) => 2,
                BugtraceError::CircuitOpen { .. } => 3,
                BugtraceError::Cancelled => 130,
                _ => 1,
            },
            CliError::Pipeline(PipelineError::AllAttemptsFailed { .. }) => 4,
            CliError::Pipeline(PipelineError::Cancelled { .. }) => 130,
        }
    }
}

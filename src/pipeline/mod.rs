pub mod state;
pub mod phase;
pub mod events;
pub mod orchestrator;

pub use state::*;
pub use events::PipelineEvent;
pub use orchestrator::AnalysisPipeline;

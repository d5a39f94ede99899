use super::state::PipelineStage;

pub struct StageDefinition {
    pub stage: PipelineStage,
    pub display_name: &'static str,
    pub description: &'static str,
}

pub static STAGES: &[StageDefinition] = &[
    StageDefinition {
        stage: PipelineStage::Scanning,
        display_name: "Scanning",
        description: "Independent analysis passes over the target",
    },
    StageDefinition {
        stage: PipelineStage::Consolidating,
        display_name: "Consolidation",
        description: "Merging the successful passes into one report",
    },
    StageDefinition {
        stage: PipelineStage::Validating,
        display_name: "Validation",
        description: "Filtering likely false positives",
    },
    StageDefinition {
        stage: PipelineStage::DeepAnalyzing,
        display_name: "Deep Analysis",
        description: "Enriching each remaining finding with a reproduction guide",
    },
    StageDefinition {
        stage: PipelineStage::Done,
        display_name: "Done",
        description: "Final report ready",
    },
    StageDefinition {
        stage: PipelineStage::Failed,
        display_name: "Failed",
        description: "Run stopped without a report",
    },
];

pub fn definition(stage: PipelineStage) -> Option<&'static StageDefinition> {
    STAGES.iter().find(|s| s.stage == stage)
}

pub fn display_name(stage: PipelineStage) -> &'static str {
    definition(stage).map(|s| s.display_name).unwrap_or("Unknown")
}

pub fn description(stage: PipelineStage) -> &'static str {
    definition(stage).map(|s| s.description).unwrap_or("")
}

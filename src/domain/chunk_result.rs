use serde::{Deserialize, Serialize};

use super::{ComplianceRequirement, TaskStage};

/// Terminal result of one chunk, keyed by its index in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkResult {
    pub chunk_index: usize,
    pub section_label: String,
    #[serde(flatten)]
    pub outcome: ChunkOutcome,
}

/// A failed chunk keeps an explicit placeholder so gaps stay visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChunkOutcome {
    Succeeded {
        requirements: Vec<ComplianceRequirement>,
    },
    Failed {
        stage: TaskStage,
        error: String,
    },
}

impl ChunkResult {
    pub fn succeeded(
        chunk_index: usize,
        section_label: String,
        requirements: Vec<ComplianceRequirement>,
    ) -> Self {
        Self {
            chunk_index,
            section_label,
            outcome: ChunkOutcome::Succeeded { requirements },
        }
    }

    pub fn failed(
        chunk_index: usize,
        section_label: String,
        stage: TaskStage,
        error: impl Into<String>,
    ) -> Self {
        Self {
            chunk_index,
            section_label,
            outcome: ChunkOutcome::Failed {
                stage,
                error: error.into(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, ChunkOutcome::Failed { .. })
    }

    pub fn requirements(&self) -> &[ComplianceRequirement] {
        match &self.outcome {
            ChunkOutcome::Succeeded { requirements } => requirements,
            ChunkOutcome::Failed { .. } => &[],
        }
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Processing stage of a chunk. Extraction always precedes control generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStage {
    Extraction,
    ControlGeneration,
}

impl TaskStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStage::Extraction => "extraction",
            TaskStage::ControlGeneration => "control_generation",
        }
    }
}

impl fmt::Display for TaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Task {
    pub chunk_index: usize,
    pub stage: TaskStage,
}

impl Task {
    pub fn extraction(chunk_index: usize) -> Self {
        Self {
            chunk_index,
            stage: TaskStage::Extraction,
        }
    }

    pub fn control_generation(chunk_index: usize) -> Self {
        Self {
            chunk_index,
            stage: TaskStage::ControlGeneration,
        }
    }
}

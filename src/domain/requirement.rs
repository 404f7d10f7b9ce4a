use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "high" | "critical" => Ok(Priority::High),
            "medium" | "moderate" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("Invalid priority: {}", other)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSuggestion {
    pub priority: Priority,
    pub control_title: String,
    pub control: String,
}

/// One enforceable obligation extracted from a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRequirement {
    pub requirement_title: String,
    pub article_number: String,
    pub priority: Priority,
    pub article_text: String,
    pub requirement: String,
    pub requirement_description: String,
    #[serde(default)]
    pub controls: Vec<ControlSuggestion>,
}

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::application::ports::{LlmClient, LlmClientError};
use crate::domain::{Chunk, ComplianceRequirement, ControlSuggestion, Priority};

use super::prompts::{control_prompt, requirement_prompt};

/// Retry behaviour for transient model errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("llm: {0}")]
    Llm(#[from] LlmClientError),
    #[error("malformed model output: {0}")]
    MalformedOutput(String),
}

#[derive(Deserialize)]
struct RequirementDraft {
    requirement_title: String,
    priority: Priority,
    requirement: String,
    #[serde(default)]
    requirement_description: String,
}

/// Runs the two model stages for a chunk: requirement extraction and
/// control suggestion.
pub struct RequirementExtractor {
    llm: Arc<dyn LlmClient>,
    retry: RetryPolicy,
}

impl RequirementExtractor {
    pub fn new(llm: Arc<dyn LlmClient>, retry: RetryPolicy) -> Self {
        Self { llm, retry }
    }

    /// Requirements cite the chunk's section number and carry the chunk
    /// text, whatever the model returned for those fields.
    pub async fn extract_requirements(
        &self,
        document_name: &str,
        chunk: &Chunk,
    ) -> Result<Vec<ComplianceRequirement>, ExtractionError> {
        let article_number = chunk.article_number();
        let prompt = requirement_prompt(document_name, &article_number, &chunk.text);
        let raw = self.complete_with_retry(&prompt).await?;

        let drafts: Vec<RequirementDraft> = parse_items(&raw, "requirement")?;
        Ok(drafts
            .into_iter()
            .map(|draft| ComplianceRequirement {
                requirement_title: draft.requirement_title,
                article_number: article_number.clone(),
                priority: draft.priority,
                article_text: chunk.text.clone(),
                requirement: draft.requirement,
                requirement_description: draft.requirement_description,
                controls: Vec::new(),
            })
            .collect())
    }

    pub async fn suggest_controls(
        &self,
        requirement: &ComplianceRequirement,
    ) -> Result<Vec<ControlSuggestion>, ExtractionError> {
        let prompt = control_prompt(&requirement.requirement);
        let raw = self.complete_with_retry(&prompt).await?;
        parse_items(&raw, "control")
    }

    async fn complete_with_retry(&self, prompt: &str) -> Result<String, LlmClientError> {
        let mut attempt = 0;
        loop {
            match self.llm.complete(prompt).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        error = %e,
                        attempt,
                        max_retries = self.retry.max_retries,
                        "Transient model error, retrying"
                    );
                    if !self.retry.backoff.is_zero() {
                        tokio::time::sleep(self.retry.backoff).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Deserializes each element of the model's JSON array, skipping elements
/// that do not fit the expected shape.
fn parse_items<T: DeserializeOwned>(raw: &str, kind: &str) -> Result<Vec<T>, ExtractionError> {
    let items = parse_json_array(raw)?;
    let total = items.len();
    let parsed: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(error = %e, kind, "Skipping malformed item in model output");
                None
            }
        })
        .collect();
    tracing::debug!(kind, total, accepted = parsed.len(), "Parsed model output");
    Ok(parsed)
}

/// Extracts the JSON array from a model response.
///
/// Accepts a bare array, an array inside a fenced code block, an array
/// embedded in surrounding prose, or an object with a single array field.
pub fn parse_json_array(raw: &str) -> Result<Vec<Value>, ExtractionError> {
    let body = strip_code_fence(raw.trim());

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(items) = into_array(value) {
            return Ok(items);
        }
    }

    if let (Some(start), Some(end)) = (body.find('['), body.rfind(']')) {
        if start < end {
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&body[start..=end]) {
                return Ok(items);
            }
        }
    }

    let preview: String = body.chars().take(120).collect();
    Err(ExtractionError::MalformedOutput(format!(
        "expected a JSON array, got: {preview}"
    )))
}

fn into_array(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => {
            let mut arrays = map.into_iter().filter_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            });
            let first = arrays.next()?;
            arrays.next().is_none().then_some(first)
        }
        _ => None,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text;
    };
    let after_open = &text[open + 3..];
    let content_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let content = &after_open[content_start..];
    match content.find("```") {
        Some(close) => content[..close].trim(),
        None => content.trim(),
    }
}

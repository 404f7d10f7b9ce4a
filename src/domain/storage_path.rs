use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::JobId;

/// Key of an object in the result store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn upload(job_id: &JobId, filename: &str) -> Self {
        Self(format!(
            "uploads/{}/{}",
            job_id.as_uuid(),
            sanitize_filename(filename)
        ))
    }

    pub fn checkpoint(job_id: &JobId, written_at: DateTime<Utc>, sequence: u64) -> Self {
        Self(format!(
            "checkpoints/{}/intermediate_{}_{:04}.json",
            job_id.as_uuid(),
            written_at.format("%Y-%m-%d_%H-%M-%S%.3f"),
            sequence
        ))
    }

    pub fn result(job_id: &JobId) -> Self {
        Self(format!("results/{}.json", job_id.as_uuid()))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{JobStatus, StoragePath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

/// Chunk counters reported by the pipeline after each terminal chunk.
/// `completed_chunks` counts every terminal chunk, failed ones included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobProgress {
    pub total_chunks: usize,
    pub completed_chunks: usize,
    pub failed_chunks: usize,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid job transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// Status of one analysis job as seen by pollers.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub document_name: String,
    pub status: JobStatus,
    pub progress: f32,
    pub message: Option<String>,
    pub total_chunks: usize,
    pub completed_chunks: usize,
    pub failed_chunks: usize,
    pub result_path: Option<StoragePath>,
    pub checkpoint_path: Option<StoragePath>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: JobId, document_name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            document_name,
            status: JobStatus::Queued,
            progress: 0.0,
            message: Some("Analysis queued".to_string()),
            total_chunks: 0,
            completed_chunks: 0,
            failed_chunks: 0,
            result_path: None,
            checkpoint_path: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn transition_to(
        &mut self,
        next: JobStatus,
        message: Option<&str>,
    ) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        if let Some(message) = message {
            self.message = Some(message.to_string());
        }
        if next == JobStatus::Failed {
            self.error_message = message.map(str::to_string);
        }
        if next == JobStatus::Completed {
            self.progress = 1.0;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Applies chunk counters. Progress never moves backwards and a job in a
    /// terminal state ignores late reports. A report that arrives after a
    /// newer one keeps the newer message.
    pub fn record_progress(&mut self, progress: &JobProgress) {
        if self.status.is_terminal() {
            return;
        }

        let is_latest = progress.completed_chunks >= self.completed_chunks;
        self.total_chunks = progress.total_chunks;
        self.completed_chunks = self.completed_chunks.max(progress.completed_chunks);
        self.failed_chunks = self.failed_chunks.max(progress.failed_chunks);

        let fraction = if progress.total_chunks == 0 {
            0.0
        } else {
            progress.completed_chunks as f32 / progress.total_chunks as f32
        };
        self.progress = self.progress.max(fraction.clamp(0.0, 1.0));
        if is_latest {
            self.message = Some(progress.message.clone());
        }
        self.updated_at = Utc::now();
    }
}

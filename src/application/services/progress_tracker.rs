use std::sync::Arc;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{JobId, JobProgress, JobStatus};

use super::AggregateCounts;

/// Writes the lifecycle and chunk counters of one job through the
/// repository, which serializes every update.
pub struct ProgressTracker {
    job_repository: Arc<dyn JobRepository>,
    job_id: JobId,
}

impl ProgressTracker {
    pub fn new(job_repository: Arc<dyn JobRepository>, job_id: JobId) -> Self {
        Self {
            job_repository,
            job_id,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub async fn start(&self) -> Result<(), RepositoryError> {
        self.transition(JobStatus::Processing, "Loading and analyzing document")
            .await
    }

    pub async fn chunks_planned(&self, total_chunks: usize) -> Result<(), RepositoryError> {
        self.job_repository
            .update_progress(
                self.job_id,
                &JobProgress {
                    total_chunks,
                    completed_chunks: 0,
                    failed_chunks: 0,
                    message: format!("Split document into {total_chunks} chunks"),
                },
            )
            .await
    }

    /// Reports a terminal chunk. Failures are logged only; a lost progress
    /// update must not fail the chunk.
    pub async fn chunk_finished(&self, counts: AggregateCounts) {
        let progress = JobProgress {
            total_chunks: counts.total,
            completed_chunks: counts.terminal,
            failed_chunks: counts.failed,
            message: format!("Processing chunk {}/{}", counts.terminal, counts.total),
        };
        if let Err(e) = self
            .job_repository
            .update_progress(self.job_id, &progress)
            .await
        {
            tracing::warn!(error = %e, "Failed to record chunk progress");
        }
    }

    pub async fn complete(&self, message: &str) -> Result<(), RepositoryError> {
        self.transition(JobStatus::Completed, message).await
    }

    pub async fn fail(&self, message: &str) -> Result<(), RepositoryError> {
        self.transition(JobStatus::Failed, message).await
    }

    /// Marks the job cancelled. A job already cancelled by the request
    /// layer is left as is.
    pub async fn cancel(&self) -> Result<(), RepositoryError> {
        let current = self.job_repository.get_by_id(self.job_id).await?;
        if current.is_some_and(|job| job.status == JobStatus::Cancelled) {
            return Ok(());
        }
        self.transition(JobStatus::Cancelled, "Analysis cancelled")
            .await
    }

    async fn transition(&self, status: JobStatus, message: &str) -> Result<(), RepositoryError> {
        tracing::debug!(status = %status, "Job status transition");
        self.job_repository
            .update_status(self.job_id, status, Some(message))
            .await
            .map(|_| ())
    }
}

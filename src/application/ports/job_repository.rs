use async_trait::async_trait;

use crate::domain::{Job, JobId, JobProgress, JobStatus, StoragePath};

use super::RepositoryError;

/// Single synchronized accessor for job status. Every mutation of a job
/// goes through one of these methods.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;

    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        message: Option<&str>,
    ) -> Result<Job, RepositoryError>;

    async fn update_progress(
        &self,
        id: JobId,
        progress: &JobProgress,
    ) -> Result<(), RepositoryError>;

    async fn set_result_path(&self, id: JobId, path: StoragePath) -> Result<(), RepositoryError>;

    async fn set_checkpoint_path(
        &self,
        id: JobId,
        path: StoragePath,
    ) -> Result<(), RepositoryError>;

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError>;
}

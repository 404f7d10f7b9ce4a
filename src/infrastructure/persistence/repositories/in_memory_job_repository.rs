use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{Job, JobId, JobProgress, JobStatus, StoragePath};

/// Job store held in process memory. The write lock makes every status
/// and progress update atomic with respect to readers.
#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn modify<T>(
        &self,
        id: JobId,
        f: impl FnOnce(&mut Job) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.as_uuid().to_string()))?;
        f(job)
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    #[instrument(skip(self, job), fields(job_id = %job.id.as_uuid()))]
    async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
        self.jobs.write().await.insert(job.id, job.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    #[instrument(skip(self, message), fields(job_id = %id.as_uuid(), status = %status))]
    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        message: Option<&str>,
    ) -> Result<Job, RepositoryError> {
        self.modify(id, |job| {
            job.transition_to(status, message)?;
            Ok(job.clone())
        })
        .await
    }

    async fn update_progress(
        &self,
        id: JobId,
        progress: &JobProgress,
    ) -> Result<(), RepositoryError> {
        self.modify(id, |job| {
            job.record_progress(progress);
            Ok(())
        })
        .await
    }

    async fn set_result_path(&self, id: JobId, path: StoragePath) -> Result<(), RepositoryError> {
        self.modify(id, |job| {
            job.result_path = Some(path);
            Ok(())
        })
        .await
    }

    async fn set_checkpoint_path(
        &self,
        id: JobId,
        path: StoragePath,
    ) -> Result<(), RepositoryError> {
        self.modify(id, |job| {
            job.checkpoint_path = Some(path);
            Ok(())
        })
        .await
    }

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError> {
        let mut jobs: Vec<Job> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|job| job.status == status)
            .cloned()
            .collect();
        jobs.sort_by_key(|job| job.created_at);
        Ok(jobs)
    }
}

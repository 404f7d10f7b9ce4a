use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;

use crate::application::ports::{
    JobRepository, LlmClient, RepositoryError, ResultStore, ResultStoreError, TextSplitter,
};
use crate::domain::{
    AnalysisResult, ChunkResult, Document, JobId, JobStatus, StoragePath, Task, TaskStage,
};

use super::{
    CancellationFlag, CheckpointWriter, ChunkProcessor, ProgressTracker, RequirementExtractor,
    ResultAggregator, RetryPolicy, WorkerPool,
};

#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub worker_count: usize,
    pub retry: RetryPolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            worker_count: 6,
            retry: RetryPolicy::default(),
        }
    }
}

/// Runs one classified document through chunking, the worker pool and
/// aggregation, then persists the final result.
pub struct AnalysisService {
    llm: Arc<dyn LlmClient>,
    text_splitter: Arc<dyn TextSplitter>,
    job_repository: Arc<dyn JobRepository>,
    result_store: Arc<dyn ResultStore>,
    options: AnalysisOptions,
}

impl AnalysisService {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        text_splitter: Arc<dyn TextSplitter>,
        job_repository: Arc<dyn JobRepository>,
        result_store: Arc<dyn ResultStore>,
        options: AnalysisOptions,
    ) -> Self {
        Self {
            llm,
            text_splitter,
            job_repository,
            result_store,
            options,
        }
    }

    /// A cancelled run returns the partial, ordered result without
    /// persisting it; the job ends as `cancelled`.
    pub async fn analyze(
        &self,
        job_id: JobId,
        document: Document,
        cancel: CancellationFlag,
    ) -> Result<AnalysisResult, AnalysisError> {
        let tracker = ProgressTracker::new(Arc::clone(&self.job_repository), job_id);
        let created_at = Utc::now();

        if document.is_empty() {
            tracker
                .fail("Document contains no extractable text")
                .await?;
            return Err(AnalysisError::EmptyDocument);
        }

        if cancel.is_cancelled() {
            tracker.cancel().await?;
            return Ok(AnalysisResult::from_chunks(
                document.name,
                document.document_type,
                0,
                Vec::new(),
                JobStatus::Cancelled,
                created_at,
            ));
        }

        tracker.start().await?;

        let chunks = self.text_splitter.split(&document);
        let total_chunks = chunks.len();
        let labels: Vec<String> = chunks.iter().map(|c| c.label()).collect();
        tracker.chunks_planned(total_chunks).await?;

        tracing::info!(
            document_name = %document.name,
            document_type = %document.document_type,
            char_count = document.len(),
            total_chunks,
            worker_count = self.options.worker_count,
            "Starting chunk analysis"
        );

        let aggregator = Arc::new(ResultAggregator::new(total_chunks));
        let processor = Arc::new(ChunkProcessor::new(
            document.name.clone(),
            chunks,
            RequirementExtractor::new(Arc::clone(&self.llm), self.options.retry),
            Arc::clone(&aggregator),
            ProgressTracker::new(Arc::clone(&self.job_repository), job_id),
            CheckpointWriter::new(
                Arc::clone(&self.result_store),
                Arc::clone(&self.job_repository),
                job_id,
            ),
            cancel.clone(),
        ));

        let tasks: Vec<Task> = (0..total_chunks).map(Task::extraction).collect();
        WorkerPool::new(self.options.worker_count)
            .run(tasks, processor, &cancel)
            .await;

        if cancel.is_cancelled() {
            tracker.cancel().await?;
            let result = AnalysisResult::from_chunks(
                document.name,
                document.document_type,
                total_chunks,
                aggregator.snapshot(),
                JobStatus::Cancelled,
                created_at,
            );
            tracing::info!(
                processed_chunks = result.processed_chunks,
                total_chunks,
                "Analysis cancelled"
            );
            return Ok(result);
        }

        let chunk_results = aggregator.finalize_with(|index| {
            ChunkResult::failed(
                index,
                labels[index].clone(),
                TaskStage::Extraction,
                "task aborted before completion",
            )
        });

        let result = AnalysisResult::from_chunks(
            document.name,
            document.document_type,
            total_chunks,
            chunk_results,
            JobStatus::Completed,
            created_at,
        );

        if let Err(e) = self.persist(job_id, &result).await {
            tracing::error!(error = %e, "Failed to persist analysis result");
            tracker
                .fail(&format!("Failed to persist result: {e}"))
                .await?;
            return Err(e);
        }

        tracker
            .complete(&format!(
                "Analysis completed. Found {} requirements in {} chunks ({} failed).",
                result.requirements_found, result.total_chunks, result.failed_chunks
            ))
            .await?;

        tracing::info!(
            requirements_found = result.requirements_found,
            failed_chunks = result.failed_chunks,
            "Analysis completed"
        );

        Ok(result)
    }

    async fn persist(&self, job_id: JobId, result: &AnalysisResult) -> Result<(), AnalysisError> {
        let path = StoragePath::result(&job_id);
        let body = serde_json::to_vec_pretty(result)?;
        self.result_store.put(&path, Bytes::from(body)).await?;
        self.job_repository.set_result_path(job_id, path).await?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("document contains no extractable text")]
    EmptyDocument,
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("result store: {0}")]
    ResultStore(#[from] ResultStoreError),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

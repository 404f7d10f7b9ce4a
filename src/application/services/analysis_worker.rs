use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::Instrument;

use crate::application::ports::{
    FileLoader, FileLoaderError, JobRepository, ResultStore, ResultStoreError,
};
use crate::domain::{AnalysisResult, Document, JobId, JobStatus, StoragePath, Upload};

use super::{AnalysisError, AnalysisService, CancellationFlag, CancellationRegistry};

pub struct AnalysisMessage {
    pub job_id: JobId,
    pub upload: Upload,
    pub storage_path: StoragePath,
    pub cancel: CancellationFlag,
}

/// Takes queued jobs off the channel one at a time, loads the staged
/// upload and hands the document to the analysis service.
pub struct AnalysisWorker {
    receiver: mpsc::Receiver<AnalysisMessage>,
    file_loader: Arc<dyn FileLoader>,
    result_store: Arc<dyn ResultStore>,
    job_repository: Arc<dyn JobRepository>,
    analysis_service: Arc<AnalysisService>,
    cancellations: Arc<CancellationRegistry>,
    classification_sample_chars: usize,
}

impl AnalysisWorker {
    pub fn new(
        receiver: mpsc::Receiver<AnalysisMessage>,
        file_loader: Arc<dyn FileLoader>,
        result_store: Arc<dyn ResultStore>,
        job_repository: Arc<dyn JobRepository>,
        analysis_service: Arc<AnalysisService>,
        cancellations: Arc<CancellationRegistry>,
        classification_sample_chars: usize,
    ) -> Self {
        Self {
            receiver,
            file_loader,
            result_store,
            job_repository,
            analysis_service,
            cancellations,
            classification_sample_chars,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Analysis worker started");
        while let Some(msg) = self.receiver.recv().await {
            let span = tracing::info_span!(
                "analysis_job",
                job_id = %msg.job_id.as_uuid(),
                document_id = %msg.upload.id.as_uuid(),
                filename = %msg.upload.filename,
            );
            self.process_job(msg).instrument(span).await;
        }
        tracing::info!("Analysis worker stopped: channel closed");
    }

    async fn process_job(&self, msg: AnalysisMessage) {
        let job_id = msg.job_id;

        let result = if msg.cancel.is_cancelled() {
            tracing::info!("Job cancelled before processing started");
            Ok(None)
        } else {
            self.process_pipeline(&msg).await.map(Some)
        };

        if let Err(e) = self.result_store.delete(&msg.storage_path).await {
            tracing::warn!(
                error = %e,
                path = %msg.storage_path,
                "Failed to delete staged upload"
            );
        }
        self.cancellations.remove(job_id);

        match result {
            Ok(Some(analysis)) => tracing::info!(
                status = %analysis.processing_status,
                requirements_found = analysis.requirements_found,
                "Analysis job finished"
            ),
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "Analysis job failed");
                self.mark_failed(job_id, &e).await;
            }
        }
    }

    async fn process_pipeline(
        &self,
        msg: &AnalysisMessage,
    ) -> Result<AnalysisResult, AnalysisWorkerError> {
        let data = self
            .result_store
            .fetch(&msg.storage_path)
            .await
            .map_err(AnalysisWorkerError::Staging)?;

        let text = self
            .file_loader
            .extract_text(&data, &msg.upload)
            .await
            .map_err(AnalysisWorkerError::FileLoading)?;

        let document = Document::classify(
            msg.upload.id,
            &msg.upload.filename,
            text,
            self.classification_sample_chars,
        );
        tracing::info!(
            document_name = %document.name,
            document_type = %document.document_type,
            "Document classified"
        );

        self.analysis_service
            .analyze(msg.job_id, document, msg.cancel.clone())
            .await
            .map_err(AnalysisWorkerError::Analysis)
    }

    /// Jobs the analysis service already moved to a terminal state are
    /// left untouched.
    async fn mark_failed(&self, job_id: JobId, error: &AnalysisWorkerError) {
        let terminal = match self.job_repository.get_by_id(job_id).await {
            Ok(Some(job)) => job.status.is_terminal(),
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load job before marking it failed");
                false
            }
        };
        if terminal {
            return;
        }

        let message = format!("Analysis failed: {error}");
        if let Err(e) = self
            .job_repository
            .update_status(job_id, JobStatus::Failed, Some(&message))
            .await
        {
            tracing::error!(error = %e, "Failed to mark job as failed");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisWorkerError {
    #[error("staging store: {0}")]
    Staging(ResultStoreError),
    #[error("file loading: {0}")]
    FileLoading(FileLoaderError),
    #[error("analysis: {0}")]
    Analysis(AnalysisError),
}

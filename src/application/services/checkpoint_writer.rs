use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::application::ports::{JobRepository, ResultStore};
use crate::domain::{ChunkResult, JobId, StoragePath};

use super::ResultAggregator;

/// Body of an intermediate checkpoint file.
#[derive(Debug, Serialize)]
pub struct CheckpointSnapshot {
    pub sequence: u64,
    pub written_at: DateTime<Utc>,
    pub total_chunks: usize,
    pub completed_chunks: usize,
    pub failed_chunks: usize,
    pub chunks: Vec<ChunkResult>,
}

/// Persists aggregator snapshots after each terminal chunk.
///
/// Writes are serialized and each snapshot is taken inside the lock, so a
/// later checkpoint never holds fewer chunks than an earlier one. Every
/// write lands under a fresh timestamped key.
pub struct CheckpointWriter {
    result_store: Arc<dyn ResultStore>,
    job_repository: Arc<dyn JobRepository>,
    job_id: JobId,
    sequence: Mutex<u64>,
}

impl CheckpointWriter {
    pub fn new(
        result_store: Arc<dyn ResultStore>,
        job_repository: Arc<dyn JobRepository>,
        job_id: JobId,
    ) -> Self {
        Self {
            result_store,
            job_repository,
            job_id,
            sequence: Mutex::new(0),
        }
    }

    /// Returns the path written, or `None` when the write failed. Failures
    /// are logged and never propagate to the chunk that triggered them.
    pub async fn write(&self, aggregator: &ResultAggregator) -> Option<StoragePath> {
        let mut sequence = self.sequence.lock().await;
        *sequence += 1;

        let chunks = aggregator.snapshot();
        let written_at = Utc::now();
        let snapshot = CheckpointSnapshot {
            sequence: *sequence,
            written_at,
            total_chunks: aggregator.total_chunks(),
            completed_chunks: chunks.len(),
            failed_chunks: chunks.iter().filter(|c| c.is_failed()).count(),
            chunks,
        };
        let path = StoragePath::checkpoint(&self.job_id, written_at, *sequence);

        let body = match serde_json::to_vec_pretty(&snapshot) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize checkpoint");
                return None;
            }
        };

        if let Err(e) = self.result_store.put(&path, Bytes::from(body)).await {
            tracing::warn!(error = %e, path = %path, "Failed to write checkpoint");
            return None;
        }

        if let Err(e) = self
            .job_repository
            .set_checkpoint_path(self.job_id, path.clone())
            .await
        {
            tracing::warn!(error = %e, path = %path, "Failed to record checkpoint path");
        }

        tracing::debug!(
            path = %path,
            completed_chunks = snapshot.completed_chunks,
            "Checkpoint written"
        );
        Some(path)
    }
}

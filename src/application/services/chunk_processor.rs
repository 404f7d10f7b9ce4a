use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::Instrument;

use crate::domain::{Chunk, ChunkResult, ComplianceRequirement, Task, TaskStage};

use super::{
    CancellationFlag, CheckpointWriter, ProgressTracker, RequirementExtractor, ResultAggregator,
    TaskHandler,
};

/// Handles the extraction and control-generation tasks of one document.
///
/// A chunk reaches its terminal state when its control-generation task
/// finishes or when either stage fails. Each terminal chunk is recorded in
/// the aggregator, reported to the tracker and checkpointed.
pub struct ChunkProcessor {
    document_name: String,
    chunks: Vec<Chunk>,
    extractor: RequirementExtractor,
    aggregator: Arc<ResultAggregator>,
    tracker: ProgressTracker,
    checkpoints: CheckpointWriter,
    cancel: CancellationFlag,
    extracted: Mutex<HashMap<usize, Vec<ComplianceRequirement>>>,
}

impl ChunkProcessor {
    pub fn new(
        document_name: String,
        chunks: Vec<Chunk>,
        extractor: RequirementExtractor,
        aggregator: Arc<ResultAggregator>,
        tracker: ProgressTracker,
        checkpoints: CheckpointWriter,
        cancel: CancellationFlag,
    ) -> Self {
        Self {
            document_name,
            chunks,
            extractor,
            aggregator,
            tracker,
            checkpoints,
            cancel,
            extracted: Mutex::new(HashMap::new()),
        }
    }

    async fn extract(&self, chunk: &Chunk) -> Option<Task> {
        let outcome = self
            .extractor
            .extract_requirements(&self.document_name, chunk)
            .await;

        if self.cancel.is_cancelled() {
            tracing::debug!("Discarding extraction result after cancellation");
            return None;
        }

        match outcome {
            Ok(requirements) => {
                tracing::info!(
                    requirement_count = requirements.len(),
                    "Requirements extracted"
                );
                self.extracted
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(chunk.index, requirements);
                Some(Task::control_generation(chunk.index))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Requirement extraction failed");
                self.finish_chunk(ChunkResult::failed(
                    chunk.index,
                    chunk.label(),
                    TaskStage::Extraction,
                    e.to_string(),
                ))
                .await;
                None
            }
        }
    }

    async fn generate_controls(&self, chunk: &Chunk) {
        let requirements = self
            .extracted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&chunk.index)
            .unwrap_or_default();

        let mut completed = Vec::with_capacity(requirements.len());
        for mut requirement in requirements {
            let outcome = self.extractor.suggest_controls(&requirement).await;
            if self.cancel.is_cancelled() {
                tracing::debug!("Discarding control results after cancellation");
                return;
            }

            match outcome {
                Ok(controls) => requirement.controls = controls,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        requirement = %requirement.requirement_title,
                        "Control generation failed"
                    );
                    self.finish_chunk(ChunkResult::failed(
                        chunk.index,
                        chunk.label(),
                        TaskStage::ControlGeneration,
                        e.to_string(),
                    ))
                    .await;
                    return;
                }
            }
            completed.push(requirement);
        }

        if self.cancel.is_cancelled() {
            return;
        }

        tracing::info!(requirement_count = completed.len(), "Chunk completed");
        self.finish_chunk(ChunkResult::succeeded(
            chunk.index,
            chunk.label(),
            completed,
        ))
        .await;
    }

    async fn finish_chunk(&self, result: ChunkResult) {
        let counts = self.aggregator.record(result);
        self.tracker.chunk_finished(counts).await;
        self.checkpoints.write(&self.aggregator).await;
    }
}

#[async_trait]
impl TaskHandler for ChunkProcessor {
    async fn handle(&self, task: Task) -> Option<Task> {
        let Some(chunk) = self.chunks.get(task.chunk_index) else {
            tracing::warn!(chunk_index = task.chunk_index, "Task for unknown chunk");
            return None;
        };

        let span = tracing::info_span!(
            "chunk_task",
            chunk_index = chunk.index,
            stage = %task.stage,
            section = %chunk.label(),
        );

        async {
            match task.stage {
                TaskStage::Extraction => self.extract(chunk).await,
                TaskStage::ControlGeneration => {
                    self.generate_controls(chunk).await;
                    None
                }
            }
        }
        .instrument(span)
        .await
    }
}

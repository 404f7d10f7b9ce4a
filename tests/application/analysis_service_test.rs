use std::sync::Arc;
use std::time::Duration;

use compliance_agent::application::ports::{JobRepository, LlmClientError, ResultStore};
use compliance_agent::application::services::{
    AnalysisError, AnalysisOptions, AnalysisService, CancellationFlag, RetryPolicy,
};
use compliance_agent::domain::{
    ChunkOutcome, Document, DocumentId, DocumentType, JobStatus, StoragePath, TaskStage,
};
use compliance_agent::infrastructure::storage::InMemoryResultStore;

use crate::helpers::{
    FixedSplitter, RecordingJobRepository, ScriptedLlmClient, build_harness,
    build_harness_with_failing_checkpoints, create_job, default_response, is_control_prompt,
    sample_document,
};

#[tokio::test]
async fn given_well_behaved_model_when_analyzing_then_completes_with_every_chunk() {
    let llm = Arc::new(ScriptedLlmClient::well_behaved());
    let harness = build_harness(llm.clone(), 4, 6, RetryPolicy::none());
    let job_id = create_job(harness.job_repository.as_ref()).await;

    let result = harness
        .service
        .analyze(job_id, sample_document(), CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(result.processing_status, JobStatus::Completed);
    assert_eq!(result.total_chunks, 4);
    assert_eq!(result.processed_chunks, 4);
    assert_eq!(result.failed_chunks, 0);
    assert_eq!(result.requirements_found, 4);
    assert!(result.extracted_data.iter().all(|r| r.controls.len() == 1));
    assert_eq!(llm.calls(), 8);

    let job = harness.job_repository.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 1.0);
    assert_eq!(job.completed_chunks, 4);
    assert_eq!(
        job.message.as_deref(),
        Some("Analysis completed. Found 4 requirements in 4 chunks (0 failed).")
    );
    assert_eq!(job.result_path, Some(StoragePath::result(&job_id)));
}

#[tokio::test]
async fn given_completed_analysis_when_reading_stored_result_then_matches_returned_result() {
    let llm = Arc::new(ScriptedLlmClient::well_behaved());
    let harness = build_harness(llm, 2, 2, RetryPolicy::none());
    let job_id = create_job(harness.job_repository.as_ref()).await;

    let result = harness
        .service
        .analyze(job_id, sample_document(), CancellationFlag::new())
        .await
        .unwrap();

    let stored = harness
        .result_store
        .fetch(&StoragePath::result(&job_id))
        .await
        .unwrap();
    let stored: serde_json::Value = serde_json::from_slice(&stored).unwrap();

    assert_eq!(stored["document_name"], "Sample Compliance Act");
    assert_eq!(stored["document_type"], "GENERAL");
    assert_eq!(stored["processing_status"], "completed");
    assert_eq!(stored["requirements_found"], result.requirements_found);
    assert_eq!(stored["chunks"][1]["chunk_index"], 1);
    assert_eq!(stored["chunks"][1]["status"], "succeeded");
}

#[tokio::test]
async fn given_slow_first_chunk_when_analyzing_then_results_stay_in_chunk_order() {
    let llm = Arc::new(ScriptedLlmClient::well_behaved().with_delay(|prompt| {
        if prompt.contains("chunk-0:") {
            Duration::from_millis(50)
        } else {
            Duration::ZERO
        }
    }));
    let harness = build_harness(llm, 5, 5, RetryPolicy::none());
    let job_id = create_job(harness.job_repository.as_ref()).await;

    let result = harness
        .service
        .analyze(job_id, sample_document(), CancellationFlag::new())
        .await
        .unwrap();

    let indices: Vec<usize> = result.chunks.iter().map(|c| c.chunk_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    let articles: Vec<&str> = result
        .extracted_data
        .iter()
        .map(|r| r.article_number.as_str())
        .collect();
    assert_eq!(articles, vec!["1", "2", "3", "4", "5"]);
}

#[tokio::test]
async fn given_one_chunk_failing_extraction_when_analyzing_then_others_still_complete() {
    let llm = Arc::new(ScriptedLlmClient::new(|_, prompt| {
        if prompt.contains("chunk-3:") && !is_control_prompt(prompt) {
            Err(LlmClientError::InvalidResponse("garbled".to_string()))
        } else {
            Ok(default_response(prompt))
        }
    }));
    let harness = build_harness(llm, 5, 3, RetryPolicy::none());
    let job_id = create_job(harness.job_repository.as_ref()).await;

    let result = harness
        .service
        .analyze(job_id, sample_document(), CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(result.processing_status, JobStatus::Completed);
    assert_eq!(result.chunks.len(), 5);
    assert_eq!(result.failed_chunks, 1);
    assert_eq!(result.requirements_found, 4);
    assert!(result.chunks[3].is_failed());
    assert!(matches!(
        result.chunks[3].outcome,
        ChunkOutcome::Failed {
            stage: TaskStage::Extraction,
            ..
        }
    ));

    let job = harness.job_repository.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.failed_chunks, 1);
    assert!(
        harness
            .result_store
            .head(&StoragePath::result(&job_id))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn given_transient_error_once_when_analyzing_then_chunk_succeeds_after_retry() {
    let llm = Arc::new(ScriptedLlmClient::new(|call, prompt| {
        if call == 1 {
            Err(LlmClientError::RateLimited)
        } else {
            Ok(default_response(prompt))
        }
    }));
    let retry = RetryPolicy {
        max_retries: 1,
        backoff: Duration::from_millis(1),
    };
    let harness = build_harness(llm.clone(), 1, 1, retry);
    let job_id = create_job(harness.job_repository.as_ref()).await;

    let result = harness
        .service
        .analyze(job_id, sample_document(), CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(result.failed_chunks, 0);
    assert_eq!(result.requirements_found, 1);
    assert_eq!(llm.calls(), 3);
}

#[tokio::test]
async fn given_control_failure_when_analyzing_then_chunks_fail_at_control_stage() {
    let llm = Arc::new(ScriptedLlmClient::new(|_, prompt| {
        if is_control_prompt(prompt) {
            Err(LlmClientError::InvalidResponse("not json".to_string()))
        } else {
            Ok(default_response(prompt))
        }
    }));
    let harness = build_harness(llm, 3, 2, RetryPolicy::none());
    let job_id = create_job(harness.job_repository.as_ref()).await;

    let result = harness
        .service
        .analyze(job_id, sample_document(), CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(result.total_chunks, 3);
    assert_eq!(result.failed_chunks, 3);
    assert_eq!(result.requirements_found, 0);
    assert!(result.chunks.iter().all(|c| matches!(
        c.outcome,
        ChunkOutcome::Failed {
            stage: TaskStage::ControlGeneration,
            ..
        }
    )));

    let job = harness.job_repository.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.failed_chunks, 3);
}

#[tokio::test]
async fn given_control_failure_on_one_chunk_when_analyzing_then_only_that_chunk_fails() {
    let llm = Arc::new(ScriptedLlmClient::new(|_, prompt| {
        if is_control_prompt(prompt) && prompt.contains("breach register") {
            Err(LlmClientError::ApiRequestFailed("HTTP 500".to_string()))
        } else if !is_control_prompt(prompt) && prompt.contains("chunk-1:") {
            Ok(r#"[{"requirement_title":"Breach log","priority":"high","requirement":"The entity shall keep a breach register"}]"#.to_string())
        } else {
            Ok(default_response(prompt))
        }
    }));
    let harness = build_harness(llm, 3, 2, RetryPolicy::none());
    let job_id = create_job(harness.job_repository.as_ref()).await;

    let result = harness
        .service
        .analyze(job_id, sample_document(), CancellationFlag::new())
        .await
        .unwrap();

    let failed: Vec<bool> = result.chunks.iter().map(|c| c.is_failed()).collect();
    assert_eq!(failed, vec![false, true, false]);
    assert!(matches!(
        result.chunks[1].outcome,
        ChunkOutcome::Failed {
            stage: TaskStage::ControlGeneration,
            ..
        }
    ));
    assert_eq!(result.failed_chunks, 1);
    assert_eq!(result.requirements_found, 2);
    assert!(result.extracted_data.iter().all(|r| r.controls.len() == 1));
}

#[tokio::test]
async fn given_transient_control_failure_within_retries_when_analyzing_then_chunk_succeeds() {
    let failed_once = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = failed_once.clone();
    let llm = Arc::new(ScriptedLlmClient::new(move |_, prompt| {
        if is_control_prompt(prompt) && !flag.swap(true, std::sync::atomic::Ordering::SeqCst) {
            Err(LlmClientError::Timeout)
        } else {
            Ok(default_response(prompt))
        }
    }));
    let retry = RetryPolicy {
        max_retries: 1,
        backoff: Duration::ZERO,
    };
    let harness = build_harness(llm, 1, 1, retry);
    let job_id = create_job(harness.job_repository.as_ref()).await;

    let result = harness
        .service
        .analyze(job_id, sample_document(), CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(result.failed_chunks, 0);
    assert_eq!(result.extracted_data[0].controls.len(), 1);
    assert!(failed_once.load(std::sync::atomic::Ordering::SeqCst));
}

#[tokio::test]
async fn given_checkpoint_writes_failing_when_analyzing_then_job_still_completes() {
    let llm = Arc::new(ScriptedLlmClient::well_behaved());
    let harness = build_harness_with_failing_checkpoints(llm, 4, 2, RetryPolicy::none());
    let job_id = create_job(harness.job_repository.as_ref()).await;

    let result = harness
        .service
        .analyze(job_id, sample_document(), CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(result.processing_status, JobStatus::Completed);
    assert_eq!(result.processed_chunks, 4);
    assert_eq!(result.failed_chunks, 0);
    assert!(harness.result_store.keys_with_prefix("checkpoints/").is_empty());

    let stored = harness
        .result_store
        .fetch(&StoragePath::result(&job_id))
        .await
        .unwrap();
    let stored: serde_json::Value = serde_json::from_slice(&stored).unwrap();
    assert_eq!(stored["total_chunks"], 4);

    let job = harness.job_repository.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.checkpoint_path, None);
    assert_eq!(job.result_path, Some(StoragePath::result(&job_id)));
}

#[tokio::test]
async fn given_cancellation_after_two_chunks_when_analyzing_then_returns_partial_result() {
    let cancel = CancellationFlag::new();
    let trigger = cancel.clone();
    let llm = Arc::new(ScriptedLlmClient::new(move |call, prompt| {
        if call == 5 {
            trigger.cancel();
        }
        Ok(default_response(prompt))
    }));
    let harness = build_harness(llm, 6, 1, RetryPolicy::none());
    let job_id = create_job(harness.job_repository.as_ref()).await;

    let result = harness
        .service
        .analyze(job_id, sample_document(), cancel)
        .await
        .unwrap();

    assert_eq!(result.processing_status, JobStatus::Cancelled);
    assert_eq!(result.total_chunks, 6);
    assert_eq!(result.processed_chunks, 2);
    let indices: Vec<usize> = result.chunks.iter().map(|c| c.chunk_index).collect();
    assert_eq!(indices, vec![0, 1]);

    let job = harness.job_repository.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Cancelled);
    assert!(job.result_path.is_none());
    assert!(
        harness
            .result_store
            .head(&StoragePath::result(&job_id))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn given_cancelled_before_start_when_analyzing_then_model_is_never_called() {
    let llm = Arc::new(ScriptedLlmClient::well_behaved());
    let harness = build_harness(llm.clone(), 3, 2, RetryPolicy::none());
    let job_id = create_job(harness.job_repository.as_ref()).await;
    let cancel = CancellationFlag::new();
    cancel.cancel();

    let result = harness
        .service
        .analyze(job_id, sample_document(), cancel)
        .await
        .unwrap();

    assert_eq!(result.processing_status, JobStatus::Cancelled);
    assert!(result.chunks.is_empty());
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn given_empty_document_when_analyzing_then_fails_without_calling_model() {
    let llm = Arc::new(ScriptedLlmClient::well_behaved());
    let harness = build_harness(llm.clone(), 3, 2, RetryPolicy::none());
    let job_id = create_job(harness.job_repository.as_ref()).await;
    let document = Document::new(
        DocumentId::new(),
        "blank.txt".to_string(),
        "   \n".to_string(),
        DocumentType::General,
    );

    let result = harness
        .service
        .analyze(job_id, document, CancellationFlag::new())
        .await;

    assert!(matches!(result, Err(AnalysisError::EmptyDocument)));
    assert_eq!(llm.calls(), 0);
    let job = harness.job_repository.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
}

#[tokio::test]
async fn given_every_chunk_checkpointed_when_analyzing_then_last_checkpoint_holds_all_chunks() {
    let llm = Arc::new(ScriptedLlmClient::well_behaved());
    let harness = build_harness(llm, 3, 3, RetryPolicy::none());
    let job_id = create_job(harness.job_repository.as_ref()).await;

    harness
        .service
        .analyze(job_id, sample_document(), CancellationFlag::new())
        .await
        .unwrap();

    let keys = harness
        .result_store
        .keys_with_prefix(&format!("checkpoints/{}/", job_id.as_uuid()));
    assert_eq!(keys.len(), 3);

    let job = harness.job_repository.get_by_id(job_id).await.unwrap().unwrap();
    let latest = job.checkpoint_path.unwrap();
    let body = harness.result_store.fetch(&latest).await.unwrap();
    let snapshot: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(snapshot["sequence"], 3);
    assert_eq!(snapshot["completed_chunks"], 3);
    assert_eq!(snapshot["chunks"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn given_concurrent_chunks_when_analyzing_then_progress_never_decreases() {
    let repository = Arc::new(RecordingJobRepository::new());
    let llm = Arc::new(ScriptedLlmClient::well_behaved().with_delay(|prompt| {
        Duration::from_millis((prompt.len() % 7) as u64)
    }));
    let service = AnalysisService::new(
        llm,
        Arc::new(FixedSplitter { count: 8 }),
        repository.clone(),
        Arc::new(InMemoryResultStore::new()),
        AnalysisOptions {
            worker_count: 4,
            retry: RetryPolicy::none(),
        },
    );
    let job_id = create_job(repository.as_ref()).await;

    service
        .analyze(job_id, sample_document(), CancellationFlag::new())
        .await
        .unwrap();

    let observed = repository.observed.lock().unwrap().clone();
    assert!(!observed.is_empty());
    assert!(observed.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(observed.last().copied(), Some(1.0));
}

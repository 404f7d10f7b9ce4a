use std::sync::Arc;

use bytes::Bytes;
use compliance_agent::application::ports::{JobRepository, ResultStore};
use compliance_agent::application::services::{
    AnalysisMessage, AnalysisOptions, AnalysisService, AnalysisWorker, CancellationRegistry,
    RetryPolicy,
};
use compliance_agent::domain::{ContentType, DocumentType, JobStatus, StoragePath, Upload};
use compliance_agent::infrastructure::persistence::InMemoryJobRepository;
use compliance_agent::infrastructure::storage::InMemoryResultStore;
use compliance_agent::infrastructure::text_processing::{AdaptiveSplitter, CompositeFileLoader};
use tokio::sync::mpsc;

use crate::helpers::{ScriptedLlmClient, create_job};

struct WorkerFixture {
    llm: Arc<ScriptedLlmClient>,
    job_repository: Arc<InMemoryJobRepository>,
    result_store: Arc<InMemoryResultStore>,
    cancellations: Arc<CancellationRegistry>,
    sender: mpsc::Sender<AnalysisMessage>,
    worker: AnalysisWorker,
}

fn fixture() -> WorkerFixture {
    let llm = Arc::new(ScriptedLlmClient::well_behaved());
    let job_repository = Arc::new(InMemoryJobRepository::new());
    let result_store = Arc::new(InMemoryResultStore::new());
    let cancellations = Arc::new(CancellationRegistry::new());
    let service = Arc::new(AnalysisService::new(
        llm.clone(),
        Arc::new(AdaptiveSplitter::new(2000, 2500, 200)),
        job_repository.clone(),
        result_store.clone(),
        AnalysisOptions {
            worker_count: 2,
            retry: RetryPolicy::none(),
        },
    ));
    let (sender, receiver) = mpsc::channel(8);
    let worker = AnalysisWorker::new(
        receiver,
        Arc::new(CompositeFileLoader::with_default_adapters()),
        result_store.clone(),
        job_repository.clone(),
        service,
        cancellations.clone(),
        2000,
    );
    WorkerFixture {
        llm,
        job_repository,
        result_store,
        cancellations,
        sender,
        worker,
    }
}

const POLICY_TEXT: &str = "RBI/2024-25/07\nReserve Bank of India\n\
1. Scope\nRegulated entities shall report cyber incidents within six hours.\n\
2. Governance\nThe board shall approve the IT strategy annually.\n";

async fn stage(
    fixture: &WorkerFixture,
    text: Option<&'static str>,
) -> (AnalysisMessage, StoragePath) {
    let job_id = create_job(fixture.job_repository.as_ref()).await;
    let storage_path = StoragePath::upload(&job_id, "circular.txt");
    if let Some(text) = text {
        fixture
            .result_store
            .put(&storage_path, Bytes::from_static(text.as_bytes()))
            .await
            .unwrap();
    }
    let message = AnalysisMessage {
        job_id,
        upload: Upload::new("circular.txt".to_string(), ContentType::Text, 0),
        storage_path: storage_path.clone(),
        cancel: fixture.cancellations.register(job_id),
    };
    (message, storage_path)
}

#[tokio::test]
async fn given_staged_text_upload_when_worker_runs_then_job_completes_and_upload_is_removed() {
    let fixture = fixture();
    let (message, storage_path) = stage(&fixture, Some(POLICY_TEXT)).await;
    let job_id = message.job_id;
    fixture.sender.send(message).await.unwrap();
    drop(fixture.sender);

    fixture.worker.run().await;

    let job = fixture.job_repository.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.total_chunks, 1);
    assert!(fixture.result_store.head(&storage_path).await.is_err());

    let stored = fixture
        .result_store
        .fetch(&StoragePath::result(&job_id))
        .await
        .unwrap();
    let stored: serde_json::Value = serde_json::from_slice(&stored).unwrap();
    assert_eq!(stored["document_type"], DocumentType::Rbi.as_str());
    assert_eq!(stored["document_name"], "circular.txt");
    assert!(!fixture.cancellations.cancel(job_id));
}

#[tokio::test]
async fn given_missing_staged_upload_when_worker_runs_then_job_fails() {
    let fixture = fixture();
    let (message, _) = stage(&fixture, None).await;
    let job_id = message.job_id;
    fixture.sender.send(message).await.unwrap();
    drop(fixture.sender);

    fixture.worker.run().await;

    let job = fixture.job_repository.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(
        job.error_message
            .unwrap()
            .starts_with("Analysis failed: staging store")
    );
    assert_eq!(fixture.llm.calls(), 0);
}

#[tokio::test]
async fn given_job_cancelled_while_queued_when_worker_runs_then_job_is_skipped() {
    let fixture = fixture();
    let (message, storage_path) = stage(&fixture, Some(POLICY_TEXT)).await;
    let job_id = message.job_id;
    fixture
        .job_repository
        .update_status(job_id, JobStatus::Cancelled, Some("Analysis cancelled by request"))
        .await
        .unwrap();
    fixture.cancellations.cancel(job_id);
    fixture.sender.send(message).await.unwrap();
    drop(fixture.sender);

    fixture.worker.run().await;

    let job = fixture.job_repository.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Cancelled);
    assert_eq!(fixture.llm.calls(), 0);
    assert!(fixture.result_store.head(&storage_path).await.is_err());
}

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use compliance_agent::application::ports::{FileLoader, JobRepository, ResultStore, TextSplitter};
use compliance_agent::application::services::{
    AnalysisOptions, AnalysisService, AnalysisWorker, CancellationRegistry, RetryPolicy,
};
use compliance_agent::infrastructure::llm::create_llm_client;
use compliance_agent::infrastructure::observability::{TracingConfig, init_tracing};
use compliance_agent::infrastructure::persistence::InMemoryJobRepository;
use compliance_agent::infrastructure::storage::LocalResultStore;
use compliance_agent::infrastructure::text_processing::{AdaptiveSplitter, CompositeFileLoader};
use compliance_agent::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(
        &TracingConfig::from_settings(environment.as_str(), &settings.logging),
        settings.server.port,
    );

    let llm_client = Arc::new(create_llm_client(&settings.llm)?);
    tracing::info!(
        provider = llm_client.provider().as_str(),
        model = llm_client.model(),
        "LLM client configured"
    );

    let result_store: Arc<dyn ResultStore> =
        Arc::new(LocalResultStore::new(settings.storage.data_dir.clone())?);
    let job_repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let text_splitter: Arc<dyn TextSplitter> =
        Arc::new(AdaptiveSplitter::from_settings(&settings.chunking));
    let file_loader: Arc<dyn FileLoader> = Arc::new(CompositeFileLoader::with_default_adapters());
    let cancellations = Arc::new(CancellationRegistry::new());

    let analysis_service = Arc::new(AnalysisService::new(
        llm_client,
        text_splitter,
        Arc::clone(&job_repository),
        Arc::clone(&result_store),
        AnalysisOptions {
            worker_count: settings.processing.worker_count,
            retry: RetryPolicy {
                max_retries: settings.llm.max_retries,
                backoff: settings.llm.retry_backoff(),
            },
        },
    ));

    let (analysis_sender, analysis_receiver) = mpsc::channel(settings.processing.queue_capacity);
    let worker = AnalysisWorker::new(
        analysis_receiver,
        file_loader,
        Arc::clone(&result_store),
        Arc::clone(&job_repository),
        analysis_service,
        Arc::clone(&cancellations),
        settings.processing.classification_sample_chars,
    );
    tokio::spawn(worker.run());

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        job_repository,
        result_store,
        cancellations,
        analysis_sender,
        settings,
    };

    let router = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

mod analysis_service;
mod analysis_worker;
mod cancellation;
mod checkpoint_writer;
mod chunk_processor;
mod progress_tracker;
mod prompts;
mod requirement_extractor;
mod result_aggregator;
mod worker_pool;

pub use analysis_service::{AnalysisError, AnalysisOptions, AnalysisService};
pub use analysis_worker::{AnalysisMessage, AnalysisWorker, AnalysisWorkerError};
pub use cancellation::{CancellationFlag, CancellationRegistry};
pub use checkpoint_writer::{CheckpointSnapshot, CheckpointWriter};
pub use chunk_processor::ChunkProcessor;
pub use progress_tracker::ProgressTracker;
pub use prompts::{control_prompt, requirement_prompt};
pub use requirement_extractor::{
    ExtractionError, RequirementExtractor, RetryPolicy, parse_json_array,
};
pub use result_aggregator::{AggregateCounts, ResultAggregator};
pub use worker_pool::{Lease, TaskHandler, TaskQueue, WorkerPool};

mod analysis_result;
mod chunk;
mod chunk_result;
mod document;
mod document_type;
mod job;
mod job_status;
mod requirement;
mod storage_path;
mod task;

pub use analysis_result::AnalysisResult;
pub use chunk::Chunk;
pub use chunk_result::{ChunkOutcome, ChunkResult};
pub use document::{ContentType, Document, DocumentId, Upload, infer_document_name};
pub use document_type::DocumentType;
pub use job::{InvalidTransition, Job, JobId, JobProgress};
pub use job_status::JobStatus;
pub use requirement::{ComplianceRequirement, ControlSuggestion, Priority};
pub use storage_path::StoragePath;
pub use task::{Task, TaskStage};

mod file_loader;
mod job_repository;
mod llm_client;
mod repository_error;
mod result_store;
mod text_splitter;

pub use file_loader::{FileLoader, FileLoaderError};
pub use job_repository::JobRepository;
pub use llm_client::{LlmClient, LlmClientError};
pub use repository_error::RepositoryError;
pub use result_store::{ResultStore, ResultStoreError};
pub use text_splitter::TextSplitter;

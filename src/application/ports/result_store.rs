use bytes::Bytes;

use crate::domain::StoragePath;

/// Object storage for staged uploads, checkpoints and final results.
#[async_trait::async_trait]
pub trait ResultStore: Send + Sync {
    async fn put(&self, path: &StoragePath, data: Bytes) -> Result<u64, ResultStoreError>;

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, ResultStoreError>;

    async fn delete(&self, path: &StoragePath) -> Result<(), ResultStoreError>;

    async fn head(&self, path: &StoragePath) -> Result<u64, ResultStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ResultStoreError {
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("read failed: {0}")]
    ReadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

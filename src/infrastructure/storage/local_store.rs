use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{ResultStore, ResultStoreError};
use crate::domain::StoragePath;

/// Result store rooted at a local directory.
pub struct LocalResultStore {
    inner: Arc<LocalFileSystem>,
}

impl LocalResultStore {
    pub fn new(base_path: PathBuf) -> Result<Self, ResultStoreError> {
        std::fs::create_dir_all(&base_path)?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| ResultStoreError::WriteFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
        })
    }
}

fn not_found_or(
    path: &StoragePath,
    e: object_store::Error,
    other: fn(String) -> ResultStoreError,
) -> ResultStoreError {
    match e {
        object_store::Error::NotFound { .. } => ResultStoreError::NotFound(path.to_string()),
        e => other(e.to_string()),
    }
}

#[async_trait::async_trait]
impl ResultStore for LocalResultStore {
    async fn put(&self, path: &StoragePath, data: Bytes) -> Result<u64, ResultStoreError> {
        let store_path = StorePath::from(path.as_str());
        let size = data.len() as u64;
        self.inner
            .put(&store_path, PutPayload::from(data))
            .await
            .map_err(|e| ResultStoreError::WriteFailed(e.to_string()))?;
        Ok(size)
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, ResultStoreError> {
        let store_path = StorePath::from(path.as_str());
        let result = self
            .inner
            .get(&store_path)
            .await
            .map_err(|e| not_found_or(path, e, ResultStoreError::ReadFailed))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| ResultStoreError::ReadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), ResultStoreError> {
        let store_path = StorePath::from(path.as_str());
        self.inner
            .delete(&store_path)
            .await
            .map_err(|e| not_found_or(path, e, ResultStoreError::DeleteFailed))
    }

    async fn head(&self, path: &StoragePath) -> Result<u64, ResultStoreError> {
        let store_path = StorePath::from(path.as_str());
        let meta = self
            .inner
            .head(&store_path)
            .await
            .map_err(|e| not_found_or(path, e, ResultStoreError::ReadFailed))?;
        Ok(meta.size as u64)
    }
}

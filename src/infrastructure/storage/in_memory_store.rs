use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;

use crate::application::ports::{ResultStore, ResultStoreError};
use crate::domain::StoragePath;

/// Process-local result store for tests and ephemeral runs.
#[derive(Default)]
pub struct InMemoryResultStore {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored keys starting with `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let Ok(objects) = self.objects.read() else {
            return Vec::new();
        };
        let mut keys: Vec<String> = objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait::async_trait]
impl ResultStore for InMemoryResultStore {
    async fn put(&self, path: &StoragePath, data: Bytes) -> Result<u64, ResultStoreError> {
        let size = data.len() as u64;
        self.objects
            .write()
            .map_err(|e| ResultStoreError::WriteFailed(e.to_string()))?
            .insert(path.as_str().to_string(), data);
        Ok(size)
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, ResultStoreError> {
        self.objects
            .read()
            .map_err(|e| ResultStoreError::ReadFailed(e.to_string()))?
            .get(path.as_str())
            .map(|b| b.to_vec())
            .ok_or_else(|| ResultStoreError::NotFound(path.to_string()))
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), ResultStoreError> {
        self.objects
            .write()
            .map_err(|e| ResultStoreError::DeleteFailed(e.to_string()))?
            .remove(path.as_str())
            .map(|_| ())
            .ok_or_else(|| ResultStoreError::NotFound(path.to_string()))
    }

    async fn head(&self, path: &StoragePath) -> Result<u64, ResultStoreError> {
        self.objects
            .read()
            .map_err(|e| ResultStoreError::ReadFailed(e.to_string()))?
            .get(path.as_str())
            .map(|b| b.len() as u64)
            .ok_or_else(|| ResultStoreError::NotFound(path.to_string()))
    }
}

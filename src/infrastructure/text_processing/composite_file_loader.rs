use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{ContentType, Upload};

use super::{PdfAdapter, PlainTextAdapter};

/// Dispatches extraction to the adapter registered for the upload's type.
pub struct CompositeFileLoader {
    adapters: HashMap<ContentType, Arc<dyn FileLoader>>,
}

impl CompositeFileLoader {
    pub fn new(adapters: Vec<(ContentType, Arc<dyn FileLoader>)>) -> Self {
        Self {
            adapters: adapters.into_iter().collect(),
        }
    }

    /// PDF and plain text, the formats accepted by the upload endpoint.
    pub fn with_default_adapters() -> Self {
        Self::new(vec![
            (ContentType::Pdf, Arc::new(PdfAdapter::new()) as Arc<dyn FileLoader>),
            (ContentType::Text, Arc::new(PlainTextAdapter)),
        ])
    }
}

#[async_trait]
impl FileLoader for CompositeFileLoader {
    async fn extract_text(&self, data: &[u8], upload: &Upload) -> Result<String, FileLoaderError> {
        let adapter = self.adapters.get(&upload.content_type).ok_or_else(|| {
            FileLoaderError::UnsupportedContentType(upload.content_type.as_mime().to_string())
        })?;

        adapter.extract_text(data, upload).await
    }
}

use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{ContentType, Upload};

use super::text_sanitizer::sanitize_extracted_text;

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Default)]
pub struct PdfAdapter;

impl PdfAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileLoader for PdfAdapter {
    #[tracing::instrument(
        skip(self, data),
        fields(
            document_id = %upload.id.as_uuid(),
            filename = %upload.filename,
        )
    )]
    async fn extract_text(&self, data: &[u8], upload: &Upload) -> Result<String, FileLoaderError> {
        if upload.content_type != ContentType::Pdf {
            return Err(FileLoaderError::UnsupportedContentType(
                upload.content_type.as_mime().to_string(),
            ));
        }

        let bytes = data.to_vec();
        let raw = tokio::time::timeout(
            EXTRACTION_TIMEOUT,
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)),
        )
        .await
        .map_err(|_| FileLoaderError::ExtractionFailed("PDF extraction timed out".to_string()))?
        .map_err(|e| FileLoaderError::ExtractionFailed(format!("task join error: {e}")))?
        .map_err(|e| FileLoaderError::ExtractionFailed(format!("failed to parse PDF: {e}")))?;

        let text = sanitize_extracted_text(&raw);
        tracing::info!(char_count = text.chars().count(), "PDF text extraction complete");

        if text.is_empty() {
            return Err(FileLoaderError::NoTextFound(upload.filename.clone()));
        }

        Ok(text)
    }
}

use async_trait::async_trait;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{ContentType, Upload};

use super::text_sanitizer::sanitize_extracted_text;

pub struct PlainTextAdapter;

#[async_trait]
impl FileLoader for PlainTextAdapter {
    async fn extract_text(&self, data: &[u8], upload: &Upload) -> Result<String, FileLoaderError> {
        if upload.content_type != ContentType::Text {
            return Err(FileLoaderError::UnsupportedContentType(
                upload.content_type.as_mime().to_string(),
            ));
        }

        let raw = std::str::from_utf8(data)
            .map_err(|e| FileLoaderError::ExtractionFailed(e.to_string()))?;

        Ok(sanitize_extracted_text(raw))
    }
}

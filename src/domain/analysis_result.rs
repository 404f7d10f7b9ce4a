use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ChunkResult, ComplianceRequirement, DocumentType, JobStatus};

/// Final record of an analysis, persisted as JSON and served to callers.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub document_name: String,
    pub document_type: DocumentType,
    pub total_chunks: usize,
    pub processed_chunks: usize,
    pub failed_chunks: usize,
    pub requirements_found: usize,
    pub extracted_data: Vec<ComplianceRequirement>,
    pub chunks: Vec<ChunkResult>,
    pub processing_status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// Builds the record from chunk results already in index order.
    pub fn from_chunks(
        document_name: String,
        document_type: DocumentType,
        total_chunks: usize,
        chunks: Vec<ChunkResult>,
        processing_status: JobStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        let extracted_data: Vec<ComplianceRequirement> = chunks
            .iter()
            .flat_map(|c| c.requirements().iter().cloned())
            .collect();

        Self {
            document_name,
            document_type,
            total_chunks,
            processed_chunks: chunks.len(),
            failed_chunks: chunks.iter().filter(|c| c.is_failed()).count(),
            requirements_found: extracted_data.len(),
            extracted_data,
            chunks,
            processing_status,
            created_at,
            updated_at: Utc::now(),
        }
    }
}

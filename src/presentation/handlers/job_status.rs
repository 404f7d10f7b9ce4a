use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::domain::Job;
use crate::presentation::state::AppState;

use super::error_response::{error_response, parse_job_id};

#[derive(Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub document_name: String,
    pub status: String,
    pub progress: f32,
    pub message: Option<String>,
    pub total_chunks: usize,
    pub completed_chunks: usize,
    pub failed_chunks: usize,
    pub checkpoint_path: Option<String>,
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Job> for JobStatusResponse {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.id.as_uuid().to_string(),
            document_name: job.document_name,
            status: job.status.as_str().to_string(),
            progress: job.progress,
            message: job.message,
            total_chunks: job.total_chunks,
            completed_chunks: job.completed_chunks,
            failed_chunks: job.failed_chunks,
            checkpoint_path: job.checkpoint_path.map(|p| p.to_string()),
            error_message: job.error_message,
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn job_status_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.job_repository.get_by_id(id).await {
        Ok(Some(job)) => (StatusCode::OK, Json(JobStatusResponse::from(job))).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("Job not found: {job_id}")),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch job status");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch job: {e}"),
            )
        }
    }
}

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::domain::JobStatus;
use crate::presentation::state::AppState;

use super::error_response::{error_response, parse_job_id};

/// Returns the stored final result of a completed job.
#[tracing::instrument(skip(state))]
pub async fn results_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let job = match state.job_repository.get_by_id(id).await {
        Ok(Some(job)) => job,
        Ok(None) => {
            return error_response(StatusCode::NOT_FOUND, format!("Job not found: {job_id}"));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch job");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch job: {e}"),
            );
        }
    };

    if job.status != JobStatus::Completed {
        return error_response(
            StatusCode::PRECONDITION_FAILED,
            format!("Job is not completed. Current status: {}", job.status),
        );
    }

    let Some(path) = job.result_path else {
        return error_response(StatusCode::NOT_FOUND, "Result file not found");
    };

    let bytes = match state.result_store.fetch(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, path = %path, "Failed to read result");
            return error_response(StatusCode::NOT_FOUND, format!("Result not available: {e}"));
        }
    };

    match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, path = %path, "Stored result is not valid JSON");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Stored result is corrupt")
        }
    }
}

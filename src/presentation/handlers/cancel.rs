use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::ports::RepositoryError;
use crate::domain::JobStatus;
use crate::presentation::state::AppState;

use super::error_response::{error_response, parse_job_id};

#[derive(Serialize)]
pub struct CancelResponse {
    pub job_id: String,
    pub status: String,
    pub message: String,
}

/// Cancels a queued or running job. Work already in flight finishes but its
/// results are discarded.
#[tracing::instrument(skip(state))]
pub async fn cancel_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.job_repository.get_by_id(id).await {
        Ok(Some(job)) if job.status.is_terminal() => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Cannot cancel job with status: {}", job.status),
            );
        }
        Ok(Some(_)) => {}
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
    }

    match state
        .job_repository
        .update_status(id, JobStatus::Cancelled, Some("Analysis cancelled by request"))
        .await
    {
        Ok(_) => {}
        Err(RepositoryError::InvalidTransition(e)) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Cannot cancel job with status: {}", e.from),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to cancel job");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to cancel job: {e}"),
            );
        }
    }

    let signalled = state.cancellations.cancel(id);
    tracing::info!(job_id = %id.as_uuid(), signalled, "Job cancelled");

    (
        StatusCode::OK,
        Json(CancelResponse {
            job_id: id.as_uuid().to_string(),
            status: JobStatus::Cancelled.as_str().to_string(),
            message: "Analysis cancelled".to_string(),
        }),
    )
        .into_response()
}

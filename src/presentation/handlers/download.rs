use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;

use crate::presentation::state::AppState;

use super::error_response::{error_response, parse_job_id};

/// Serves the latest checkpoint (`intermediate`) or the final result
/// (`final`) as a JSON attachment.
#[tracing::instrument(skip(state))]
pub async fn download_handler(
    State(state): State<AppState>,
    Path((job_id, kind)): Path<(String, String)>,
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

    let path = match kind.as_str() {
        "intermediate" => job.checkpoint_path,
        "final" => job.result_path,
        other => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid file type: {other}. Use 'intermediate' or 'final'"),
            );
        }
    };

    let Some(path) = path else {
        return error_response(StatusCode::NOT_FOUND, format!("No {kind} file for this job"));
    };

    match state.result_store.fetch(&path).await {
        Ok(bytes) => {
            let filename = path.as_str().rsplit('/').next().unwrap_or("result.json");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/json".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %path, "Download target missing");
            error_response(StatusCode::NOT_FOUND, format!("File not available: {e}"))
        }
    }
}

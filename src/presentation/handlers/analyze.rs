use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;

use crate::application::services::AnalysisMessage;
use crate::domain::{ContentType, Job, JobId, JobStatus, StoragePath, Upload};
use crate::presentation::state::AppState;

use super::error_response::error_response;

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub job_id: String,
    pub status: String,
    pub message: String,
}

/// Accepts a PDF or text upload and queues it for analysis.
#[tracing::instrument(skip(state, multipart))]
pub async fn analyze_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let (filename, content_type_str, data) = loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let Some(filename) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                match field.bytes().await {
                    Ok(data) => break (filename, content_type, data),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to read file bytes");
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            format!("Failed to read file: {e}"),
                        );
                    }
                }
            }
            Ok(None) => {
                tracing::warn!("Analyze request with no file");
                return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read multipart: {e}"),
                );
            }
        }
    };

    tracing::debug!(
        filename = %filename,
        content_type = %content_type_str,
        "Processing file upload"
    );

    let content_type = match ContentType::from_mime(&content_type_str)
        .or_else(|| ContentType::from_filename(&filename))
    {
        Some(ct) => ct,
        None => {
            tracing::warn!(content_type = %content_type_str, "Unsupported content type");
            return error_response(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("Unsupported file type: {filename}. Upload a PDF or text file."),
            );
        }
    };

    if data.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Uploaded file is empty");
    }

    tracing::debug!(bytes = data.len(), "File data received");

    let upload = Upload::new(filename.clone(), content_type, data.len() as u64);
    let job_id = JobId::new();
    let storage_path = StoragePath::upload(&job_id, &filename);

    if let Err(e) = state
        .result_store
        .put(&storage_path, data)
        .await
    {
        tracing::error!(error = %e, "Failed to stage upload");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to store upload: {e}"),
        );
    }

    let job = Job::new(job_id, filename.clone());
    if let Err(e) = state.job_repository.create(&job).await {
        tracing::error!(error = %e, "Failed to create job record");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to create job: {e}"),
        );
    }

    let cancel = state.cancellations.register(job_id);
    let msg = AnalysisMessage {
        job_id,
        upload,
        storage_path,
        cancel,
    };

    if let Err(e) = state.analysis_sender.try_send(msg) {
        let (reason, msg) = match e {
            TrySendError::Full(msg) => ("Analysis queue is full", msg),
            TrySendError::Closed(msg) => ("Analysis worker unavailable", msg),
        };
        tracing::error!(job_id = %job_id.as_uuid(), reason, "Failed to enqueue analysis job");
        state.cancellations.remove(job_id);
        if let Err(e) = state.result_store.delete(&msg.storage_path).await {
            tracing::warn!(error = %e, "Failed to remove staged upload");
        }
        if let Err(e) = state
            .job_repository
            .update_status(job_id, JobStatus::Failed, Some(reason))
            .await
        {
            tracing::warn!(error = %e, "Failed to mark unqueued job as failed");
        }
        return error_response(StatusCode::SERVICE_UNAVAILABLE, reason);
    }

    tracing::info!(
        job_id = %job_id.as_uuid(),
        filename = %filename,
        "Analysis job enqueued"
    );

    (
        StatusCode::ACCEPTED,
        Json(AnalyzeResponse {
            job_id: job_id.as_uuid().to_string(),
            status: job.status.as_str().to_string(),
            message: "Document analysis started".to_string(),
        }),
    )
        .into_response()
}

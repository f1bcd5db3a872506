//! Route handlers. Each one is a thin adapter over
//! [`crate::service::ConversionService`].

use super::AppState;
use crate::error::ServiceError;
use crate::pipeline::pptx::PPTX_MIME;
use crate::service::{ResultResponse, StatusResponse, UploadResponse};
use axum::body::Body;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tokio_util::io::ReaderStream;

/// Multipart field carrying the document.
const FILE_FIELD: &str = "file";

/// GET /
pub async fn index() -> &'static str {
    "pdf2pptx backend is running!"
}

/// GET /api/health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /api/upload
///
/// Reads the `file` field of a multipart form and submits it. Requests that
/// are not multipart, or carry no `file` field, get `No file part`.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ServiceError> {
    let mut multipart = multipart.map_err(|_| no_file_part())?;
    let limit = state.service.config().max_upload_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;

        let upload_id = state.service.submit(filename.as_deref(), &data).await?;
        return Ok(Json(UploadResponse { upload_id }));
    }

    Err(no_file_part())
}

/// GET /api/status/{upload_id}
pub async fn status(
    State(state): State<AppState>,
    Path(upload_id): Path<String>,
) -> Result<Json<StatusResponse>, ServiceError> {
    state.service.status(&upload_id).map(Json)
}

/// GET /api/result/{upload_id}
pub async fn result(
    State(state): State<AppState>,
    Path(upload_id): Path<String>,
) -> Result<Json<ResultResponse>, ServiceError> {
    state.service.result(&upload_id).map(Json)
}

/// GET /api/download/{upload_id}
///
/// Streams the artifact as an attachment.
pub async fn download(
    State(state): State<AppState>,
    Path(upload_id): Path<String>,
) -> Result<Response, ServiceError> {
    let artifact = state.service.artifact(&upload_id)?;
    let file = tokio::fs::File::open(&artifact.path).await.map_err(|e| {
        ServiceError::Internal(format!(
            "Cannot open artifact '{}': {}",
            artifact.path.display(),
            e
        ))
    })?;

    let headers = [
        (CONTENT_TYPE, PPTX_MIME.to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.name),
        ),
        (CONTENT_LENGTH, artifact.size.to_string()),
    ];
    Ok((StatusCode::OK, headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

fn no_file_part() -> ServiceError {
    ServiceError::InvalidInput("No file part".into())
}

fn multipart_error(err: MultipartError, limit: usize) -> ServiceError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::TooLarge { limit }
    } else {
        ServiceError::InvalidInput(err.body_text())
    }
}

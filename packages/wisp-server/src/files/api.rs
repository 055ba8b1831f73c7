//! File drop REST API handlers.
//!
//! - `POST /api/files/upload`        - Encrypt and store a multipart `file`
//! - `GET  /api/files/download/:id`  - Decrypt once, then destroy
//! - `GET  /api/files/check/:id`     - Existence check, never decrypts
//! - `GET  /api/files/status`        - Plain-text file count
//! - `POST /api/files/clear`         - Wipe every file

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use wisp_core::crypto::secure_wipe;
use wisp_core::FileStore;

use crate::error::ApiError;
use crate::state::AppState;

/// Filename used when the client sends none, or one that sanitizes to nothing.
pub const FALLBACK_FILENAME: &str = "download";

// ── Response Types ───────────────────────────────────────────────────────────

/// Response for every file endpoint except download and status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    pub message: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_minutes: Option<i64>,
}

impl FileResponse {
    fn ok(message: &str) -> Self {
        Self {
            file_id: None,
            message: message.to_string(),
            success: true,
            expires_in_minutes: None,
        }
    }

    fn failed(message: &str) -> Self {
        Self {
            success: false,
            ..Self::ok(message)
        }
    }
}

fn error_response(status: StatusCode, msg: &str) -> (StatusCode, Json<FileResponse>) {
    (status, Json(FileResponse::failed(msg)))
}

/// Strip characters that would break out of a quoted header parameter.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}

fn too_large_message(state: &AppState) -> String {
    format!("File too large (max {}MB)", state.config.max_upload_mib())
}

fn multipart_failure(state: &AppState, err: &MultipartError) -> (StatusCode, Json<FileResponse>) {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return error_response(StatusCode::BAD_REQUEST, &too_large_message(state));
    }
    tracing::warn!(error = %err, "Failed to read upload");
    error_response(StatusCode::BAD_REQUEST, "Upload failed")
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/files/upload
///
/// Multipart form fields:
/// - `file`: the payload; its filename is kept for the download
///
/// Other fields are ignored.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<FileResponse>) {
    let mut upload: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return multipart_failure(&state, &e),
        };

        if field.name() != Some("file") {
            continue;
        }

        let name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK_FILENAME.to_string());

        match field.bytes().await {
            Ok(bytes) => upload = Some((name, bytes.to_vec())),
            Err(e) => return multipart_failure(&state, &e),
        }
    }

    let Some((name, mut data)) = upload else {
        return error_response(StatusCode::BAD_REQUEST, "File is empty");
    };

    if data.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "File is empty");
    }

    if data.len() > state.config.max_upload_bytes {
        secure_wipe(&mut data);
        return error_response(StatusCode::BAD_REQUEST, &too_large_message(&state));
    }

    // Encryption of up to the upload limit is CPU-bound.
    let files = state.files.clone();
    let stored = tokio::task::spawn_blocking(move || files.store(&name, &mut data)).await;

    match stored {
        Ok(Ok(file_id)) => (
            StatusCode::OK,
            Json(FileResponse {
                file_id: Some(file_id),
                expires_in_minutes: Some(state.config.file_ttl_minutes()),
                ..FileResponse::ok("File uploaded successfully")
            }),
        ),
        Ok(Err(e)) => {
            tracing::warn!(code = e.code(), "Failed to store upload");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Upload failed")
        }
        Err(e) => {
            tracing::error!(error = %e, "Upload task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Upload failed")
        }
    }
}

/// GET /api/files/download/:id
///
/// Returns the decrypted bytes as an attachment. The file is destroyed
/// whether or not the transfer completes.
pub async fn download_file(
    State(files): State<FileStore>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let downloaded = tokio::task::spawn_blocking(move || files.download(&id))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Download task failed");
            ApiError::internal("Download failed")
        })?
        .map_err(|e| match e {
            e if e.is_not_found() => ApiError::not_found("File not found or expired"),
            other => ApiError::from_core(other, "Download failed"),
        })?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_filename(&downloaded.name)
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_bytes(disposition.as_bytes()).unwrap_or_else(|_| {
            HeaderValue::from_static("attachment; filename=\"download\"")
        }),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(downloaded.data.len()));

    Ok((StatusCode::OK, headers, Body::from(downloaded.data)).into_response())
}

/// GET /api/files/check/:id
///
/// Always 200; `success` says whether the file can still be downloaded.
pub async fn check_file(
    State(files): State<FileStore>,
    Path(id): Path<String>,
) -> Json<FileResponse> {
    match files.retrieve(&id) {
        Ok(_) => Json(FileResponse {
            file_id: Some(id),
            ..FileResponse::ok("File exists")
        }),
        Err(_) => Json(FileResponse::failed("File not found or expired")),
    }
}

/// GET /api/files/status
pub async fn status(State(files): State<FileStore>) -> String {
    format!("Server running - {} files in memory", files.count())
}

/// POST /api/files/clear
pub async fn clear_files(State(files): State<FileStore>) -> Json<FileResponse> {
    let cleared = files.clear_all();
    tracing::info!(count = cleared, "Cleared all files");
    Json(FileResponse::ok("All files cleared from memory"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

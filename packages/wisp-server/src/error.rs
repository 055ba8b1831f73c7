//! HTTP error mapping.
//!
//! Core errors are typed; this module turns them into status codes and a
//! `{"success": false, "error": "..."}` body. Not-found and expired collapse
//! into one 404 so callers cannot tell them apart.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// An error ready to be sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status sent to the client
    pub status: StatusCode,
    /// Client-facing error text
    pub message: String,
}

impl ApiError {
    /// Error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 Bad Request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404 Not Found.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 500 Internal Server Error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map a core error, using `context` as the client-facing text for
    /// anything that is not a plain lookup miss or validation failure.
    pub fn from_core(err: wisp_core::Error, context: &str) -> Self {
        match err {
            e if e.is_not_found() => Self::not_found(context),
            wisp_core::Error::Validation(msg) => Self::bad_request(msg),
            other => {
                tracing::warn!(code = other.code(), "Request failed");
                Self::internal(context)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "success": false,
                "error": self.message,
            })),
        )
            .into_response()
    }
}

impl From<wisp_core::Error> for ApiError {
    fn from(err: wisp_core::Error) -> Self {
        let context = err.to_string();
        Self::from_core(err, &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp_core::Error;

    #[test]
    fn test_lookup_errors_map_to_404() {
        let e = ApiError::from_core(Error::NotFound, "File not found or expired");
        assert_eq!(e.status, StatusCode::NOT_FOUND);
        assert_eq!(e.message, "File not found or expired");

        let e = ApiError::from_core(Error::Expired, "File not found or expired");
        assert_eq!(e.status, StatusCode::NOT_FOUND);
        assert_eq!(e.message, "File not found or expired");
    }

    #[test]
    fn test_crypto_maps_to_500() {
        let e = ApiError::from_core(Error::Crypto("tag mismatch".into()), "Download failed");
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        // Internal detail stays server-side
        assert_eq!(e.message, "Download failed");
    }

    #[test]
    fn test_exhaustion_maps_to_500() {
        let e: ApiError = Error::IdSpaceExhausted { attempts: 64 }.into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let e = ApiError::from_core(Error::Validation("File is empty".into()), "Upload failed");
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.message, "File is empty");
    }

    #[tokio::test]
    async fn test_response_body() {
        let response = ApiError::not_found("Message not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Message not found");
    }
}

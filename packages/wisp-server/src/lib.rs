//! Wisp Server
//!
//! HTTP front end for the Wisp core stores:
//!
//! 1. **File drop**: a client uploads a file, gets back a three-character
//!    id, and whoever holds the id can download it exactly once within the
//!    hour. The file is encrypted at rest and wiped after the download.
//!
//! 2. **Message board**: short plaintext messages that expire after an hour.
//!
//! **Privacy**: nothing touches disk, and nothing identifying (ids, names,
//! contents) is written to the logs.

pub mod config;
pub mod error;
pub mod files;
pub mod messages;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let body_limit = state.config.body_limit();

    Router::new()
        // File drop
        .route("/api/files/upload", post(files::api::upload_file))
        .route("/api/files/download/:id", get(files::api::download_file))
        .route("/api/files/check/:id", get(files::api::check_file))
        .route("/api/files/status", get(files::api::status))
        .route("/api/files/clear", post(files::api::clear_files))
        // Messages
        .route("/api/messages/send", post(messages::api::send_message))
        .route("/api/messages/all", get(messages::api::all_messages))
        .route(
            "/api/messages/:id",
            get(messages::api::get_message).delete(messages::api::delete_message),
        )
        .route("/api/messages/clear", post(messages::api::clear_messages))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "wisp-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

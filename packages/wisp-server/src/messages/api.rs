//! Message board REST API handlers.
//!
//! - `POST   /api/messages/send`  - Post a message
//! - `GET    /api/messages/all`   - Every live message, oldest first
//! - `GET    /api/messages/:id`   - One message
//! - `DELETE /api/messages/:id`   - Remove one message
//! - `POST   /api/messages/clear` - Remove every message

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wisp_core::{Error, Message, MessageStore};

use crate::error::ApiError;

// ── Request / Response Types ─────────────────────────────────────────────────

/// POST /api/messages/send
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendMessageRequest {
    pub content: Option<String>,
    pub sender_id: Option<String>,
}

/// Response for every message endpoint, including list items.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageResponse {
    fn done() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            message_id: Some(message.id),
            content: Some(message.content),
            sender_id: Some(message.sender_id),
            timestamp: Some(message.timestamp),
            ..Self::done()
        }
    }
}

/// Pull both fields out of a send request, rejecting missing or blank ones.
pub fn validate(request: SendMessageRequest) -> wisp_core::Result<(String, String)> {
    let content = request
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| Error::Validation("Message content cannot be empty".into()))?;
    let sender_id = request
        .sender_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::Validation("Sender ID is required".into()))?;
    Ok((content, sender_id))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/messages/send
pub async fn send_message(
    State(messages): State<MessageStore>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let (content, sender_id) =
        validate(request).map_err(|e| ApiError::from_core(e, "Failed to send message"))?;

    let message = messages
        .send(&content, &sender_id)
        .map_err(|e| ApiError::from_core(e, "Failed to send message"))?;

    Ok(Json(message.into()))
}

/// GET /api/messages/all
///
/// Items have the same shape as the send response.
pub async fn all_messages(State(messages): State<MessageStore>) -> Json<Vec<MessageResponse>> {
    Json(messages.get_all().into_iter().map(MessageResponse::from).collect())
}

/// GET /api/messages/:id
pub async fn get_message(
    State(messages): State<MessageStore>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    messages
        .get(&id)
        .map(|message| Json(message.into()))
        .ok_or_else(|| ApiError::not_found("Message not found"))
}

/// DELETE /api/messages/:id
///
/// Deleting an id that is already gone still succeeds.
pub async fn delete_message(
    State(messages): State<MessageStore>,
    Path(id): Path<String>,
) -> Json<MessageResponse> {
    messages.delete(&id);
    Json(MessageResponse {
        message_id: Some(id),
        ..MessageResponse::done()
    })
}

/// POST /api/messages/clear
pub async fn clear_messages(State(messages): State<MessageStore>) -> Json<MessageResponse> {
    let cleared = messages.clear_all();
    tracing::info!(count = cleared, "Cleared all messages");
    Json(MessageResponse::done())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

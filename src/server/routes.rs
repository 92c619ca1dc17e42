//! HTTP route handlers for the chat memory API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::memory::core::errors::MemoryError;
use crate::memory::core::ids::ConversationId;
use crate::memory::core::message::ChatMessage;

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ai/chat", post(chat))
        .route("/ai/list/{session_id}", get(list_messages))
        .route("/ai/clear/{session_id}", delete(clear_conversation))
        .route(
            "/ai/delete/{session_id}/{message_id}",
            delete(delete_message),
        )
        .with_state(state)
}

/// Map a memory error to an HTTP error response.
fn error_response(err: MemoryError) -> (StatusCode, String) {
    let status = match err {
        MemoryError::Backend(_) => StatusCode::SERVICE_UNAVAILABLE,
        MemoryError::HttpClient(_) | MemoryError::Completion(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!("Request failed ({status}): {err}");
    (status, err.to_string())
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "chat-memory",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Chat request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Conversation to continue.
    pub session_id: String,
    /// The user's question.
    pub question: String,
}

/// Chat response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Conversation the turn was recorded in.
    pub session_id: String,
    /// The assistant's answer.
    pub response: String,
}

/// Answer a question with conversation memory.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let conversation_id = ConversationId::new(request.session_id);
    let response = state
        .chat
        .chat(&conversation_id, &request.question)
        .await
        .map_err(error_response)?;

    Ok(Json(ChatResponse {
        session_id: conversation_id.into_string(),
        response,
    }))
}

/// List a whole conversation, most recent message first.
async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, (StatusCode, String)> {
    let conversation_id = ConversationId::new(session_id);
    let messages = state
        .memory
        .read(&conversation_id, -1)
        .await
        .map_err(error_response)?;
    Ok(Json(messages))
}

/// Drop a conversation.
async fn clear_conversation(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let conversation_id = ConversationId::new(session_id);
    state
        .memory
        .clear(&conversation_id)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete one message by its id.
async fn delete_message(
    State(state): State<Arc<AppState>>,
    Path((session_id, message_id)): Path<(String, String)>,
) -> Result<StatusCode, (StatusCode, String)> {
    let conversation_id = ConversationId::new(session_id);
    state
        .memory
        .delete_by_message_id(&conversation_id, &message_id)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

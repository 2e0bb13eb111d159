//! `POST /chat` handler.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::dto::{ChatRequest, ChatResponse};
use crate::error::AppError;
use crate::ServerState;

/// Answers one chat message for the caller's user id.
pub async fn chat(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let request_id = Uuid::new_v4();

    let Json(req) = payload.map_err(|e| {
        warn!(%request_id, "Rejected chat body: {}", e);
        AppError::internal(e)
    })?;

    let user_id = req.user_id();
    info!(%request_id, user_id, "Chat request: {}...", req.message.chars().take(50).collect::<String>());

    let reply = state.chat.chat(user_id, &req.message).await.map_err(|e| {
        error!(%request_id, user_id, "Chat failed: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(ChatResponse { text: reply.text }))
}

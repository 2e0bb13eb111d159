//! Application error types and Axum response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use vitalis_core::ChatError;

use crate::dto::ChatResponse;

pub const BUSY_TEXT: &str = "system busy, try again later";
pub const UNAVAILABLE_TEXT: &str = "server temporarily unavailable";

/// Application-level errors with HTTP status code mapping.
///
/// The detail is for logs only; callers see one of two fixed bodies.
#[derive(Debug)]
pub enum AppError {
    RateLimited(String),
    Internal(String),
}

impl AppError {
    /// Creates an Internal error from any error type.
    pub fn internal(e: impl std::fmt::Display) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e.is_rate_limited() {
            true => AppError::RateLimited(e.to_string()),
            false => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, text) = match self {
            AppError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, BUSY_TEXT),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, UNAVAILABLE_TEXT),
        };
        (status, Json(ChatResponse { text: text.to_string() })).into_response()
    }
}

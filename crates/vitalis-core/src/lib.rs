//! Core domain types and error definitions for vitalis.
//!
//! This crate provides the fundamental types shared across the workspace:
//!
//! - [`LlmError`]: Error type for model and embedding calls
//! - [`ChatError`]: Error type for a whole chat exchange
//! - [`Turn`] and [`Role`]: Conversation history entries
//!
//! # Example
//!
//! ```rust
//! use vitalis_core::{Role, Turn};
//!
//! let turn = Turn::user("What's my blood pressure average?");
//! assert_eq!(turn.role, Role::User);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User id applied when a chat request does not carry one.
pub const DEFAULT_USER_ID: &str = "default-user";

/// Errors raised by the generative model and embedding clients.
#[derive(Error, Debug)]
pub enum LlmError {
    /// The provider rejected the call because a quota or rate limit was hit.
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The provider answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The request never produced a response.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The response carried no usable candidate or embedding.
    #[error("Empty response from provider")]
    EmptyResponse,

    /// The provider withheld the answer (prompt block or blocking finish reason).
    #[error("Response blocked: {0}")]
    Blocked(String),
}

impl LlmError {
    /// Whether this failure is the provider's rate-limit signal.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LlmError::RateLimited(_))
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::Decode(err.to_string())
    }
}

/// Errors that end a chat exchange.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Model call failed (after any retries).
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Tool dispatch or execution failed.
    #[error("Tool failed: {0}")]
    Tool(String),
}

impl ChatError {
    /// Whether the exchange failed because the provider kept rate-limiting us.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ChatError::Llm(e) => e.is_rate_limited(),
            ChatError::Tool(_) => false,
        }
    }
}

/// Author of a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message from the user.
    User,
    /// Reply from the model.
    Model,
}

/// A single entry in a user's conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced the text.
    pub role: Role,
    /// Plain text of the entry.
    pub text: String,
}

impl Turn {
    /// Creates a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    /// Creates a model turn.
    pub fn model(text: impl Into<String>) -> Self {
        Self { role: Role::Model, text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detection() {
        assert!(LlmError::RateLimited("quota".into()).is_rate_limited());
        assert!(!LlmError::Api { status: 500, body: String::new() }.is_rate_limited());

        let chat: ChatError = LlmError::RateLimited("quota".into()).into();
        assert!(chat.is_rate_limited());
        assert!(!ChatError::Tool("boom".into()).is_rate_limited());
    }

    #[test]
    fn test_turn_serialization() {
        let json = serde_json::to_value(Turn::model("hi")).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "model", "text": "hi" }));
    }
}

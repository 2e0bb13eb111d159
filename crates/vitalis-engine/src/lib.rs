//! Chat engine for vitalis.
//!
//! - [`ChatService`]: per-request orchestration
//! - [`ToolExchange`]: the single-hop tool-calling state machine
//! - [`ConversationStore`]: per-user history with serialized access

mod exchange;
mod history;
mod prompt;
mod service;

pub use exchange::{ExchangeOutcome, ExchangeState, ToolCallRecord, ToolExchange};
pub use history::{retain_recent, ConversationGuard, ConversationStore};
pub use prompt::build_prompt;
pub use service::{ChatReply, ChatService, DEFAULT_HISTORY_LIMIT, DEFAULT_TOP_K};

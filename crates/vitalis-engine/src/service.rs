//! Chat orchestration: history, retrieval, tool exchange, history update.

use std::sync::Arc;

use tracing::{debug, info, warn};
use vitalis_core::{ChatError, Turn};
use vitalis_llm::{Content, GenerativeModel, RetryPolicy, Sleeper, TokioSleeper};
use vitalis_rag::{join_context, Retriever};
use vitalis_tools::ToolRegistry;

use crate::exchange::{ToolCallRecord, ToolExchange};
use crate::history::{retain_recent, ConversationStore};
use crate::prompt::build_prompt;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const DEFAULT_TOP_K: usize = 3;

/// Answer to one chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Answers chat messages for any number of users.
pub struct ChatService {
    model: Arc<dyn GenerativeModel>,
    retriever: Option<Arc<dyn Retriever>>,
    tools: ToolRegistry,
    history: Arc<ConversationStore>,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    history_limit: usize,
    top_k: usize,
}

impl ChatService {
    pub fn new(model: Arc<dyn GenerativeModel>, tools: ToolRegistry) -> Self {
        Self {
            model,
            retriever: None,
            tools,
            history: Arc::new(ConversationStore::new()),
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            history_limit: DEFAULT_HISTORY_LIMIT,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_history(mut self, history: Arc<ConversationStore>) -> Self {
        self.history = history;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn history(&self) -> &ConversationStore {
        &self.history
    }

    /// Answers `message` for `user_id` and records the plain exchange in history.
    ///
    /// Requests for the same user are handled one at a time. On error the
    /// history is left untouched.
    pub async fn chat(&self, user_id: &str, message: &str) -> Result<ChatReply, ChatError> {
        let mut conversation = self.history.lock(user_id).await;

        let context = self.retrieve_context(message).await;

        let mut contents: Vec<Content> = conversation.iter().map(Content::from).collect();
        contents.push(Content::user_text(build_prompt(&context, message)));

        let outcome = ToolExchange::new(
            self.model.as_ref(),
            &self.tools,
            self.retry,
            self.sleeper.as_ref(),
            user_id,
            contents,
        )
        .run()
        .await?;

        info!(
            user_id,
            model_calls = outcome.model_calls,
            tool_calls = outcome.tool_calls.len(),
            "Chat exchange complete"
        );

        conversation.push(Turn::user(message));
        conversation.push(Turn::model(outcome.text.clone()));
        retain_recent(&mut conversation, self.history_limit);

        Ok(ChatReply { text: outcome.text, tool_calls: outcome.tool_calls })
    }

    /// Context for the prompt; empty when retrieval is disabled or fails.
    async fn retrieve_context(&self, message: &str) -> String {
        let Some(retriever) = &self.retriever else {
            return String::new();
        };

        match retriever.similarity_search(message, self.top_k).await {
            Ok(docs) => {
                debug!("Retrieved {} documents", docs.len());
                join_context(&docs)
            }
            Err(e) => {
                warn!("Retrieval failed, continuing without context: {}", e);
                String::new()
            }
        }
    }
}

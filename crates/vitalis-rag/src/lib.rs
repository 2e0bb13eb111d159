//! Retrieval for vitalis: similarity search over a pgvector document table.

mod schema;
mod store;

pub use schema::TableSchema;
pub use store::{vector_to_pg, PgVectorStore};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use vitalis_core::LlmError;

/// Errors from the retrieval path.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Embedding failed: {0}")]
    Embedding(#[from] LlmError),
    #[error("Invalid identifier in table schema: {0:?}")]
    InvalidSchema(String),
}

/// A stored document returned by a similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub content: String,
    pub metadata: Value,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into(), metadata: Value::Null }
    }
}

/// Nearest-neighbour lookup of documents for a query string.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Top `k` documents, closest first.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>, RetrievalError>;
}

/// Joins document text into one context block, blank line between documents.
pub fn join_context(docs: &[Document]) -> String {
    docs.iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

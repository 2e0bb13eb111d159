use std::sync::Mutex;

use async_trait::async_trait;
use vitalis_core::LlmError;
use vitalis_rag::{Document, RetrievalError, Retriever};

/// Retriever returning the same documents for every query.
#[derive(Default)]
pub struct StaticRetriever {
    docs: Vec<Document>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl StaticRetriever {
    pub fn new(snippets: &[&str]) -> Self {
        Self {
            docs: snippets.iter().map(|s| Document::new(*s)).collect(),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Every `(query, k)` pair seen so far.
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>, RetrievalError> {
        self.queries.lock().unwrap().push((query.to_string(), k));
        Ok(self.docs.iter().take(k).cloned().collect())
    }
}

/// Retriever whose every search fails.
#[derive(Debug, Default)]
pub struct FailingRetriever;

#[async_trait]
impl Retriever for FailingRetriever {
    async fn similarity_search(&self, _query: &str, _k: usize) -> Result<Vec<Document>, RetrievalError> {
        Err(RetrievalError::Embedding(LlmError::Http("connection refused".into())))
    }
}

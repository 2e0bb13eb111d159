//! Gemini provider access for vitalis: generation, embeddings and rate-limit retry.

mod client;
mod embedding;
mod retry;
pub mod types;

pub use client::{GeminiClient, GenerativeModel};
pub use embedding::{Embedder, GeminiEmbedder};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper, DEFAULT_DELAY, DEFAULT_RETRIES};
pub use types::{
    Content, ContentRole, FunctionCall, FunctionDeclaration, FunctionResponse, GenerateRequest,
    GenerateResponse, Part,
};

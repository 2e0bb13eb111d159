//! Environment-driven configuration for the vitalis server.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Missing required variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TABLE: &str = "bp_docs_gemini";
pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 1;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "public";

// ─────────────────────────────────────────────────────────────────────────────
// Config Structs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub embedding_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorTableConfig {
    pub table: String,
    pub id_column: String,
    pub vector_column: String,
    pub content_column: String,
    pub metadata_column: String,
}

impl Default for VectorTableConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            id_column: "id".to_string(),
            vector_column: "embedding".to_string(),
            content_column: "text".to_string(),
            metadata_column: "metadata".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Postgres connection string; retrieval is disabled when absent.
    pub database_url: Option<String>,
    pub top_k: usize,
    pub columns: VectorTableConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    pub attempts: u32,
    pub delay_ms: u64,
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub static_dir: String,
    pub history_limit: usize,
    pub gemini: GeminiConfig,
    pub retrieval: RetrievalConfig,
    pub retry: RetryConfig,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let gemini = GeminiConfig {
            api_key,
            api_base: get("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            embedding_model: get("GEMINI_EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
        };

        let columns = VectorTableConfig {
            table: get("VECTOR_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            ..VectorTableConfig::default()
        };

        let retrieval = RetrievalConfig {
            database_url: get("DATABASE_URL"),
            top_k: parse_or(&get, "RETRIEVAL_TOP_K", DEFAULT_TOP_K)?,
            columns,
        };

        let retry = RetryConfig {
            attempts: parse_or(&get, "RETRY_ATTEMPTS", DEFAULT_RETRY_ATTEMPTS)?,
            delay_ms: parse_or(&get, "RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS)?,
        };

        let history_limit = parse_or(&get, "HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?;
        if history_limit == 0 {
            return Err(ConfigError::Invalid { var: "HISTORY_LIMIT", value: "0".into() });
        }

        Ok(Self {
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
            static_dir: get("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            history_limit,
            gemini,
            retrieval,
            retry,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

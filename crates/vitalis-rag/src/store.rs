//! pgvector-backed similarity search.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tracing::{debug, info};
use vitalis_llm::Embedder;

use crate::schema::TableSchema;
use crate::{Document, RetrievalError, Retriever};

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

/// Document table in Postgres searched by cosine distance.
pub struct PgVectorStore {
    pool: PgPool,
    embedder: Arc<dyn Embedder>,
    schema: TableSchema,
}

impl PgVectorStore {
    /// Builds a store whose pool connects on first use.
    pub fn connect_lazy(
        database_url: &str,
        schema: TableSchema,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, RetrievalError> {
        schema.validate()?;
        let pool = pool_options().connect_lazy(database_url)?;
        Ok(Self { pool, embedder, schema })
    }

    /// Creates the `vector` extension and the document table when missing.
    pub async fn ensure_schema(&self) -> Result<(), RetrievalError> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;
        sqlx::query(&self.schema.create_table_sql())
            .execute(&self.pool)
            .await?;
        info!("Vector table ready: {}", self.schema.table);
        Ok(())
    }
}

#[async_trait]
impl Retriever for PgVectorStore {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>, RetrievalError> {
        let embedding = self.embedder.embed(query).await?;
        let vec_text = vector_to_pg(&embedding);

        let rows = sqlx::query(&self.schema.search_sql())
            .bind(vec_text)
            .bind(k as i64)
            .fetch_all(&self.pool)
            .await?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            let content: Option<String> = row.try_get(0)?;
            let metadata: Option<Value> = row.try_get(1)?;
            docs.push(Document {
                content: content.unwrap_or_default(),
                metadata: metadata.unwrap_or(Value::Null),
            });
        }

        debug!("Similarity search returned {} documents", docs.len());
        Ok(docs)
    }
}

/// pgvector text literal, e.g. `[0.1,0.2]`.
pub fn vector_to_pg(vector: &[f32]) -> String {
    let body = vector
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("[{}]", body)
}

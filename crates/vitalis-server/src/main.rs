use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use vitalis_config::AppConfig;
use vitalis_engine::ChatService;
use vitalis_llm::{GeminiClient, GeminiEmbedder, RetryPolicy};
use vitalis_rag::{PgVectorStore, TableSchema};
use vitalis_server::{router, ServerState};
use vitalis_tools::default_registry;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    let state = Arc::new(init_server_state(&config).await);

    let static_dir = Path::new(&config.static_dir);
    let app = router(state, static_dir.is_dir().then_some(static_dir));
    if !static_dir.is_dir() {
        warn!("Static directory {} not found; serving API only", config.static_dir);
    }

    let addr = config.listen_addr();
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn init_server_state(config: &AppConfig) -> ServerState {
    let gemini = &config.gemini;
    let model = GeminiClient::new(&gemini.api_base, &gemini.model, &gemini.api_key);
    info!("Using model {}", model.model());

    let retry = RetryPolicy::new(config.retry.attempts, config.retry.delay());

    let mut chat = ChatService::new(Arc::new(model), default_registry())
        .with_retry(retry)
        .with_history_limit(config.history_limit)
        .with_top_k(config.retrieval.top_k);

    match &config.retrieval.database_url {
        Some(url) => {
            let columns = &config.retrieval.columns;
            let schema = TableSchema {
                table: columns.table.clone(),
                id_column: columns.id_column.clone(),
                vector_column: columns.vector_column.clone(),
                content_column: columns.content_column.clone(),
                metadata_column: columns.metadata_column.clone(),
            };
            let embedder = Arc::new(GeminiEmbedder::new(
                &gemini.api_base,
                &gemini.embedding_model,
                &gemini.api_key,
            ));

            match PgVectorStore::connect_lazy(url, schema, embedder) {
                Ok(store) => {
                    if let Err(e) = store.ensure_schema().await {
                        warn!("Could not prepare vector table (retrieval will retry per request): {}", e);
                    }
                    info!("Retrieval enabled on table {}", columns.table);
                    chat = chat.with_retriever(Arc::new(store));
                }
                Err(e) => warn!("Retrieval disabled: {}", e),
            }
        }
        None => warn!("Retrieval disabled: DATABASE_URL not configured"),
    }

    ServerState::new(chat)
}

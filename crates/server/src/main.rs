mod api;
mod db;
mod router;
mod state;

use std::sync::Arc;

use tracing::info;

use folio_index::{EmbeddingIndex, PgStore, SummaryStore};
use folio_llm::Composer;
use folio_qa::QaEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    folio_core::config::load_dotenv();
    let config = folio_core::Config::from_env();
    config.log_summary();

    if !config.embedding.is_configured() {
        anyhow::bail!(
            "embedding provider '{}' is not configured (set EMBEDDING_PROVIDER / OPENAI_API_KEY)",
            config.embedding.provider
        );
    }
    if !config.llm.is_configured() {
        anyhow::bail!(
            "LLM provider '{}' is not configured (set LLM_PROVIDER and its API key)",
            config.llm.provider
        );
    }

    let pool = db::init_pg_pool(&config.postgres).await?;
    let store = Arc::new(PgStore::new(pool));

    let embedder = folio_ingest::create_embedder(&config.embedding)?;
    info!(
        "Embedder ready (provider: {}, model: {})",
        config.embedding.provider, config.embedding.model
    );
    let composer = Composer::from_config(&config.llm)?;
    info!(
        "Composer ready (provider: {}, answer: {}, summary: {})",
        config.llm.provider, config.llm.answer_model, config.llm.summary_model
    );

    let index = EmbeddingIndex::new(
        store.clone(),
        embedder.clone(),
        config.embedding.batch_size,
        config.embedding.max_retries,
    );
    let summaries = SummaryStore::new(store, embedder, config.embedding.max_retries);
    let engine = QaEngine::new(
        index,
        summaries,
        composer,
        config.qa.max_chunk_tokens,
        config.qa.top_k,
    );

    let state = Arc::new(state::AppState {
        engine: Arc::new(engine),
    });
    let app = router::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://localhost:{}", config.server.port);
    axum::serve(listener, app).await?;

    Ok(())
}

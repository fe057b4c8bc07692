//! HTTP server implementation using Axum.

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use knowdesk_core::config::KnowDeskConfig;
use knowdesk_core::traits::{Provider, Repository};
use knowdesk_retrieval::{ContextAssembler, KeywordScorer};
use knowdesk_store::{FileTextStore, JsonStore};

/// Shared state for the gateway server.
pub struct AppState {
    pub config: KnowDeskConfig,
    /// Knowledge-base and chat persistence.
    pub store: Arc<JsonStore>,
    /// Extracted document text, file per document.
    pub texts: Arc<FileTextStore>,
    /// Upstream LLM backend.
    pub provider: Arc<dyn Provider>,
    /// Retrieval engine — pure and shared across turns.
    pub assembler: Arc<ContextAssembler>,
    pub start_time: std::time::Instant,
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/v1/health", get(super::routes::system_health))
        .route("/api/v1/knowledge-bases", get(super::routes::list_knowledge_bases))
        .route("/api/v1/knowledge-bases", post(super::routes::create_knowledge_base))
        .route("/api/v1/knowledge-bases/{id}", get(super::routes::get_knowledge_base))
        .route(
            "/api/v1/knowledge-bases/{id}/documents/{doc_id}/content",
            get(super::routes::document_content),
        )
        .route(
            "/api/v1/knowledge-bases/{id}/documents/{doc_id}",
            delete(super::routes::delete_document),
        )
        .route("/api/v1/chats", get(super::routes::list_chats))
        .route("/api/v1/chats", post(super::routes::create_chat))
        .route("/api/v1/chats/{id}", get(super::routes::get_chat))
        .route("/api/v1/chats/{id}/messages", post(super::chat::post_message));

    let public = Router::new().route("/health", get(super::routes::health_check));

    api.merge(public)
        .layer({
            let cors = CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
                .max_age(std::time::Duration::from_secs(3600));

            // Restrict CORS origins in production via env var
            // Example: KNOWDESK_CORS_ORIGINS=https://kb.example.com
            if let Ok(origins_str) = std::env::var("KNOWDESK_CORS_ORIGINS") {
                let origins: Vec<_> = origins_str
                    .split(',')
                    .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
                    .collect();
                cors.allow_origin(origins)
            } else {
                // Development fallback — allow all origins
                cors.allow_origin(Any)
            }
        })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn start(config: KnowDeskConfig) -> anyhow::Result<()> {
    let data_dir = config.storage.data_dir.clone();
    let store = Arc::new(JsonStore::open(&data_dir)?);
    let texts = Arc::new(FileTextStore::new(&data_dir)?);

    let bases = store.load_knowledge_bases().unwrap_or_default();
    let chats = store.load_chats().unwrap_or_default();
    tracing::info!(
        "📚 Store ready at {}: {} knowledge base(s), {} chat(s)",
        data_dir.display(),
        bases.len(),
        chats.len()
    );

    let provider: Arc<dyn Provider> =
        Arc::from(knowdesk_providers::create_provider(&config)?);
    tracing::info!("🤖 Upstream provider: {} ({})", provider.name(), config.llm.model);

    let assembler = Arc::new(ContextAssembler::new(
        config.retrieval.clone(),
        Box::new(KeywordScorer),
    ));

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = Arc::new(AppState {
        config,
        store,
        texts,
        provider,
        assembler,
        start_time: std::time::Instant::now(),
    });

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 KnowDesk gateway listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

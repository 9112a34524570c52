use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use safesign_core::{
    config::Config, index::SemanticIndex, retrieve::ContextRetriever, segment::ClauseSegmenter,
};
use safesign_retrieval::HttpSemanticIndex;

mod routes;

// ── AppState ──────────────────────────────────────────────────────────────

pub struct AppState {
    pub config: Arc<Config>,
    pub segmenter: ClauseSegmenter,
    pub retriever: Arc<ContextRetriever>,
    pub start_time: Instant,
}

// ── main ──────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "safesign_server=info,safesign_core=info".into()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let segmenter = ClauseSegmenter::new()?;

    let statutes = build_index(&config.statute_index_url, &config)?;
    let precedents = build_index(&config.precedent_index_url, &config)?;
    if statutes.is_none() {
        info!("no statute index configured, retrieval will degrade to sentinel context");
    }
    if precedents.is_none() {
        info!("no precedent index configured, retrieval will degrade to sentinel context");
    }
    let retriever = Arc::new(
        ContextRetriever::new(statutes, precedents)
            .with_top_k(config.statute_top_k, config.precedent_top_k),
    );

    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        segmenter,
        retriever,
        start_time: Instant::now(),
    });

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        // Health
        .route("/api/health", get(routes::health))
        .route("/api/status", get(routes::get_status))
        // Analysis
        .route("/api/analyze", post(routes::analyze))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.web_bind, config.web_port);
    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build an index client for a corpus, or None when no URL is configured
/// (retrieval then degrades to sentinel context).
fn build_index(url: &str, config: &Config) -> anyhow::Result<Option<Arc<dyn SemanticIndex>>> {
    if url.is_empty() {
        return Ok(None);
    }
    let mut index = HttpSemanticIndex::new(url, config.index_timeout_s)?;
    if !config.index_api_key.is_empty() {
        index = index.with_api_key(config.index_api_key.clone());
    }
    Ok(Some(Arc::new(index)))
}

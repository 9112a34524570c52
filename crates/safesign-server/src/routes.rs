use std::convert::Infallible;
use std::sync::Arc;

use anyhow::{bail, Result};
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::{info, warn};

use safesign_core::{
    completion::CompletionBackend,
    config::Config,
    pipeline::EvaluationPipeline,
    scorer::RiskScorer,
    stream::{ndjson_line, ProgressEmitter},
    suggest::SuggestionGenerator,
    types::ProgressEvent,
};
use safesign_model::{GeminiBackend, OllamaBackend};

use crate::AppState;

// ── Request body types ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(crate) struct AnalyzeBody {
    /// Per-invocation model credential; falls back to the configured key.
    /// Never persisted.
    pub api_key: Option<String>,
    pub text: String,
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn get_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_s": state.start_time.elapsed().as_secs(),
        "backend": state.config.backend,
        "model": state.config.model,
        "statute_index": !state.config.statute_index_url.is_empty(),
        "precedent_index": !state.config.precedent_index_url.is_empty(),
        "max_concurrent": state.config.max_concurrent,
    }))
}

/// Evaluate a contract, streaming progress as newline-delimited JSON.
///
/// One line per event; consumers parse line-by-line and stop on `complete`
/// or `error`. The response starts immediately; the pipeline runs in a
/// spawned task and keeps feeding the body as clauses finish.
pub(crate) async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnalyzeBody>,
) -> impl IntoResponse {
    let (line_tx, line_rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(run_analysis(state, body, line_tx));

    let stream = UnboundedReceiverStream::new(line_rx).map(Ok::<_, Infallible>);
    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(stream),
    )
}

// ── Analysis driver ───────────────────────────────────────────────────────

async fn run_analysis(
    state: Arc<AppState>,
    body: AnalyzeBody,
    line_tx: mpsc::UnboundedSender<String>,
) {
    let (mut emitter, mut event_rx) = ProgressEmitter::new();

    // Forward events to the response body as NDJSON lines. Stops on the
    // terminal event or when the client disconnects.
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let terminal = matches!(
                event,
                ProgressEvent::Complete { .. } | ProgressEvent::Error { .. }
            );
            if line_tx.send(ndjson_line(&event)).is_err() {
                return;
            }
            if terminal {
                return;
            }
        }
    });

    // Pre-flight: resolve the credential and build the completion backend.
    // Failure here is batch-level: one terminal error event, no partials.
    let backend = match build_backend(&state.config, body.api_key.as_deref()) {
        Ok(b) => b,
        Err(e) => {
            warn!("analysis pre-flight failed: {e}");
            emitter.error(format!("analysis setup failed: {e}"));
            return;
        }
    };

    let clauses = state.segmenter.segment(&body.text);
    info!(clauses = clauses.len(), "contract segmented");
    emitter.progress(
        0,
        clauses.len(),
        format!("analyzing {} clauses...", clauses.len()),
    );

    let scorer = Arc::new(RiskScorer::new(Arc::clone(&backend)));
    let suggester = Arc::new(SuggestionGenerator::new(backend));
    let pipeline = EvaluationPipeline::new(Arc::clone(&state.retriever), scorer, suggester);

    pipeline
        .run(clauses, state.config.max_concurrent, &mut emitter)
        .await;
}

fn build_backend(
    config: &Config,
    request_key: Option<&str>,
) -> Result<Arc<dyn CompletionBackend>> {
    match config.backend.as_str() {
        "ollama" => Ok(Arc::new(
            OllamaBackend::new(config.ollama_base_url.clone(), config.model.clone())
                .with_timeout(config.model_timeout_s),
        )),
        _ => {
            let key = request_key
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| config.gemini_api_key.clone());
            if key.is_empty() {
                bail!("no model API key in request and none configured");
            }
            Ok(Arc::new(
                GeminiBackend::new(key, config.model.clone())
                    .with_timeout(config.model_timeout_s),
            ))
        }
    }
}

//! HTTP search API server.
//!
//! Serves nearest-neighbor queries over a store snapshot loaded once at
//! startup. Ingestion must not run against the same checkpoint path while
//! the server is up; restart the server to pick up new episodes.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::search::{SearchHit, Searcher};
use crate::store::SnippetStore;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    searcher: Searcher,
    default_k: usize,
}

/// Run the HTTP search API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let checkpoint = settings.checkpoint_path();
    if !SnippetStore::checkpoint_exists(&checkpoint) {
        Output::error("No archive found. Run `skald ingest` before serving.");
        anyhow::bail!("missing checkpoint");
    }

    // Load the snapshot exactly once; queries are read-only against it
    let store = SnippetStore::load(&checkpoint)?;
    let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::new(&settings.embedding)?);
    let searcher = Searcher::new(store, embedder, &settings.search.series_strip);

    let state = Arc::new(AppState {
        searcher,
        default_k: settings.search.default_k,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/search", get(search))
        .layer(cors)
        .with_state(state.clone());

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Skald Search API");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    Output::kv("Snippets", &state.searcher.len().to_string());
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET /health");
    Output::kv("Search", "GET /search?q=<query>&k=<count>");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    k: Option<usize>,
}

#[derive(serde::Serialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(serde::Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let k = params.k.unwrap_or(state.default_k);

    match state.searcher.search(&params.q, k).await {
        Ok(results) => Json(SearchResponse { results }).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

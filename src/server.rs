//! HTTP API server for querying the ingested collection.
//!
//! Provides a REST endpoint for similarity queries with optional LLM
//! summarization.

use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::error::Result;
use crate::rag::{QueryEngine, RankedResult};
use crate::vector_store::SqliteVectorStore;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state.
///
/// The query engine (and the store handle inside it) is constructed once at
/// startup and dropped at shutdown; nothing here is process-global.
pub struct AppState {
    engine: QueryEngine,
    default_n_results: usize,
}

impl AppState {
    /// Build the application state from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);
        let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding));

        let engine = QueryEngine::new(
            store,
            embedder,
            settings.vector_store.collection.clone(),
            &settings.rag,
        );

        Ok(Self {
            engine,
            default_n_results: settings.rag.n_results,
        })
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/query", post(query))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server until interrupted.
pub async fn run_server(host: &str, port: u16, settings: Settings) -> Result<()> {
    let state = Arc::new(AppState::from_settings(&settings)?);
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct QueryRequest {
    query: String,
    n_results: Option<usize>,
    /// Forward the retrieved context to the LLM and include its answer.
    #[serde(default)]
    summarize: bool,
}

#[derive(Serialize)]
struct QueryResponse {
    status: &'static str,
    results: Vec<RankedResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> impl IntoResponse {
    if req.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Query text is required".to_string(),
            }),
        )
            .into_response();
    }

    let n_results = req.n_results.unwrap_or(state.default_n_results);

    if req.summarize {
        match state.engine.summarize(&req.query, n_results).await {
            Ok(rag) => Json(QueryResponse {
                status: "success",
                results: rag.sources,
                answer: Some(rag.answer),
            })
            .into_response(),
            Err(e) => error_response(e),
        }
    } else {
        match state.engine.query(&req.query, n_results).await {
            Ok(results) => Json(QueryResponse {
                status: "success",
                results,
                answer: None,
            })
            .into_response(),
            Err(e) => error_response(e),
        }
    }
}

fn error_response(e: crate::SpoleError) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{documents, health, ingest, query, search};
use crate::state::AppState;

/// Application router: ingestion, query, search and document listing, with
/// CORS and request tracing layered on top.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/ingest", post(ingest::ingest))
        .route("/api/ingest/auto", post(ingest::auto_index))
        .route("/api/query", post(query::query))
        .route("/api/search", get(search::search))
        .route("/api/documents", get(documents::list_documents))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

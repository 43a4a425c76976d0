use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
use crate::ingest::ProcessedDocument;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    #[serde(default)]
    pub file_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub processed_documents: usize,
    pub documents: Vec<ProcessedDocument>,
}

/// Ingest a batch of Drive files. Per-file failures are skipped; the
/// response lists only the documents that landed, so a shorter list than
/// the request signals a partial failure.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    if request.file_ids.is_empty() {
        return Err(ApiError::BadRequest("File IDs array is required".into()));
    }

    let documents = state.pipeline.ingest(&request.file_ids).await;
    Ok(Json(IngestResponse {
        processed_documents: documents.len(),
        documents,
    }))
}

/// Index every supported file the Drive account can list.
pub async fn auto_index(
    State(state): State<Arc<AppState>>,
) -> Result<Json<IngestResponse>, ApiError> {
    let documents = state.pipeline.auto_index().await?;
    Ok(Json(IngestResponse {
        processed_documents: documents.len(),
        documents,
    }))
}

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::core::errors::ApiError;
use crate::state::AppState;
use crate::vector::DocumentSummary;

#[derive(Debug, Serialize)]
pub struct DocumentsResponse {
    pub documents: Vec<DocumentSummary>,
}

pub async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DocumentsResponse>, ApiError> {
    let documents = state.store.list_documents().await?;
    Ok(Json(DocumentsResponse { documents }))
}

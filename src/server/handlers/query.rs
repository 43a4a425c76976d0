use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::core::errors::ApiError;
use crate::rag::{Answer, AnswerOptions, ChatTurn};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,
    #[serde(default)]
    pub is_summary: bool,
    #[serde(default)]
    pub selected_documents: Option<Vec<String>>,
}

pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Answer>, ApiError> {
    if request.question.trim().is_empty() {
        return Err(ApiError::BadRequest("Question is required".into()));
    }

    let opts = AnswerOptions {
        is_summary: request.is_summary,
        selected_documents: request.selected_documents,
    };
    let answer = state
        .answerer
        .answer(&request.question, &request.chat_history, &opts)
        .await?;
    Ok(Json(answer))
}

//! Standalone search with lexical re-ranking.
//!
//! Vector-store matches are filtered to those sharing at least one query
//! word, then re-ranked by blending the backend similarity score with the
//! fraction of query words found in the text.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
use crate::llm::LlmProvider;
use crate::vector::{RetrievalMatch, VectorStore};

const SEARCH_CANDIDATES: usize = 20;
const MAX_RESULTS: usize = 10;
const VECTOR_WEIGHT: f32 = 0.7;
const LEXICAL_WEIGHT: f32 = 0.3;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub title: String,
    pub text: String,
    pub filename: String,
    pub chunk_index: usize,
}

pub struct SearchService {
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn VectorStore>,
}

impl SearchService {
    pub fn new(provider: Arc<dyn LlmProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { provider, store }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ApiError> {
        let embedding = self.provider.embed(query).await?;
        let matches = self
            .store
            .query(&embedding, SEARCH_CANDIDATES, None)
            .await?;
        Ok(blend_rank(matches, query))
    }
}

/// Fraction of query words appearing (case-insensitive substring) in `text`.
fn lexical_overlap(text_lower: &str, query_words: &[String]) -> f32 {
    if query_words.is_empty() {
        return 0.0;
    }
    let found = query_words
        .iter()
        .filter(|word| text_lower.contains(word.as_str()))
        .count();
    found as f32 / query_words.len() as f32
}

/// Discard matches sharing no word with the query, then rank by the blended
/// score (0.7 vector similarity, 0.3 lexical overlap), top 10.
pub fn blend_rank(matches: Vec<RetrievalMatch>, query: &str) -> Vec<SearchHit> {
    let query_words: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mut scored: Vec<(f32, RetrievalMatch)> = matches
        .into_iter()
        .filter_map(|m| {
            let overlap = lexical_overlap(&m.text.to_lowercase(), &query_words);
            if overlap == 0.0 {
                return None;
            }
            let combined = m.score * VECTOR_WEIGHT + overlap * LEXICAL_WEIGHT;
            Some((combined, m))
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(MAX_RESULTS);

    scored
        .into_iter()
        .map(|(combined, m)| SearchHit {
            title: if m.filename.is_empty() {
                "Untitled Document".to_string()
            } else {
                m.filename.clone()
            },
            id: m.id,
            score: combined,
            text: m.text,
            filename: m.filename,
            chunk_index: m.chunk_index.unwrap_or(0),
        })
        .collect()
}

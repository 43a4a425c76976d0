use serde::{Deserialize, Serialize};

use crate::chunker::DocumentChunk;

/// Metadata persisted alongside each vector. Carries the chunk text itself
/// so retrieval needs no second lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorMetadata {
    pub text: String,
    pub filename: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_position: Option<usize>,
}

/// One record as shipped to the vector backend. The store owns persisted
/// records exclusively; upsert by an existing id overwrites in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredVector {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: VectorMetadata,
}

impl StoredVector {
    pub fn from_chunk(chunk: &DocumentChunk, values: Vec<f32>) -> Self {
        StoredVector {
            id: chunk.id.clone(),
            values,
            metadata: VectorMetadata {
                text: chunk.text.clone(),
                filename: chunk.metadata.filename.clone(),
                chunk_index: chunk.metadata.chunk_index,
                total_chunks: chunk.metadata.total_chunks,
                page_number: chunk.metadata.page_number,
                start_position: chunk.metadata.start_position,
                end_position: chunk.metadata.end_position,
            },
        }
    }

    /// Estimated wire size: 4 bytes per float plus metadata JSON and id
    /// bytes. Used to keep upsert batches under the backend message limit.
    pub fn estimated_bytes(&self) -> usize {
        let metadata_bytes = serde_json::to_string(&self.metadata)
            .map(|s| s.len())
            .unwrap_or(0);
        self.values.len() * 4 + metadata_bytes + self.id.len()
    }
}

/// One similarity-query hit, ordered by descending backend score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalMatch {
    pub id: String,
    pub text: String,
    pub filename: String,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_chunks: Option<usize>,
}

impl RetrievalMatch {
    pub fn from_metadata(id: String, score: f32, metadata: VectorMetadata) -> Self {
        RetrievalMatch {
            id,
            text: metadata.text,
            filename: metadata.filename,
            score,
            page_number: metadata.page_number,
            start_position: metadata.start_position,
            end_position: metadata.end_position,
            chunk_index: Some(metadata.chunk_index),
            total_chunks: Some(metadata.total_chunks),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub filename: String,
    pub total_chunks: usize,
}

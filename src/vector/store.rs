use async_trait::async_trait;

use crate::core::errors::ApiError;

use super::types::{DocumentSummary, RetrievalMatch, StoredVector};

/// Result window for the neutral-vector document listing.
const LISTING_TOP_K: usize = 10_000;

/// Abstract vector storage backend.
///
/// Upsert is idempotent by id: re-upserting an existing id overwrites it in
/// place, last write wins. The index is a single flat namespace.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Embedding dimensionality the backing index was created with. A
    /// mismatch between this and the active provider's output is a fatal
    /// configuration error surfaced at store time.
    fn dimension(&self) -> usize;

    /// Persist records, splitting into wire-size-bounded batches as needed.
    /// A batch failure aborts the remaining batches of the call.
    async fn upsert(&self, records: Vec<StoredVector>) -> Result<(), ApiError>;

    /// Top-k similarity query, ranked by descending backend score.
    /// `filenames` restricts matches to the given source documents.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filenames: Option<&[String]>,
    ) -> Result<Vec<RetrievalMatch>, ApiError>;

    /// Distinct indexed documents.
    ///
    /// Default implementation queries with a neutral (zero) vector at a
    /// large top-k and deduplicates by filename client-side — an
    /// approximation that assumes every document keeps at least one chunk
    /// inside the result window. Backends with a real listing API should
    /// override it.
    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, ApiError> {
        let neutral = vec![0.0f32; self.dimension()];
        let matches = self.query(&neutral, LISTING_TOP_K, None).await?;

        let mut documents: Vec<DocumentSummary> = Vec::new();
        for m in matches {
            if documents.iter().any(|d| d.filename == m.filename) {
                continue;
            }
            documents.push(DocumentSummary {
                filename: m.filename,
                total_chunks: m.total_chunks.unwrap_or(0),
            });
        }
        Ok(documents)
    }
}

/// Brute-force cosine similarity, shared by the local backends.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![0.3, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn mismatched_or_zero_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}

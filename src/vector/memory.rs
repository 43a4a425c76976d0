//! In-memory vector store: brute-force cosine ranking over a map.
//! Zero-setup backend for tests and local development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::core::errors::ApiError;

use super::store::{cosine_similarity, VectorStore};
use super::types::{RetrievalMatch, StoredVector};

pub struct MemoryVectorStore {
    dimension: usize,
    records: RwLock<HashMap<String, StoredVector>>,
}

impl MemoryVectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn upsert(&self, records: Vec<StoredVector>) -> Result<(), ApiError> {
        let mut map = self
            .records
            .write()
            .map_err(|_| ApiError::Storage("memory store poisoned".into()))?;
        for record in records {
            map.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filenames: Option<&[String]>,
    ) -> Result<Vec<RetrievalMatch>, ApiError> {
        let map = self
            .records
            .read()
            .map_err(|_| ApiError::Storage("memory store poisoned".into()))?;

        let mut scored: Vec<RetrievalMatch> = map
            .values()
            .filter(|record| match filenames {
                Some(allowed) => allowed.contains(&record.metadata.filename),
                None => true,
            })
            .map(|record| {
                RetrievalMatch::from_metadata(
                    record.id.clone(),
                    cosine_similarity(vector, &record.values),
                    record.metadata.clone(),
                )
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::types::VectorMetadata;

    fn record(id: &str, filename: &str, values: Vec<f32>) -> StoredVector {
        StoredVector {
            id: id.to_string(),
            values,
            metadata: VectorMetadata {
                text: format!("text of {id}"),
                filename: filename.to_string(),
                chunk_index: 0,
                total_chunks: 1,
                page_number: None,
                start_position: None,
                end_position: None,
            },
        }
    }

    #[tokio::test]
    async fn query_ranks_by_cosine_similarity() {
        let store = MemoryVectorStore::new(3);
        store
            .upsert(vec![
                record("near", "a.txt", vec![1.0, 0.0, 0.0]),
                record("far", "b.txt", vec![0.0, 1.0, 0.0]),
            ])
            .await
            .unwrap();

        let matches = store.query(&[1.0, 0.1, 0.0], 10, None).await.unwrap();
        assert_eq!(matches[0].id, "near");
        assert!(matches[0].score > matches[1].score);
    }

    #[tokio::test]
    async fn upsert_overwrites_by_id() {
        let store = MemoryVectorStore::new(2);
        store
            .upsert(vec![record("c1", "a.txt", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert(vec![record("c1", "a.txt", vec![0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let matches = store.query(&[0.0, 1.0], 1, None).await.unwrap();
        assert!(matches[0].score > 0.99);
    }

    #[tokio::test]
    async fn filename_filter_restricts_matches() {
        let store = MemoryVectorStore::new(2);
        store
            .upsert(vec![
                record("c1", "a.txt", vec![1.0, 0.0]),
                record("c2", "b.txt", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let allowed = vec!["b.txt".to_string()];
        let matches = store.query(&[1.0, 0.0], 10, Some(&allowed)).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].filename, "b.txt");
    }

    #[tokio::test]
    async fn neutral_vector_listing_sees_every_document() {
        let store = MemoryVectorStore::new(2);
        store
            .upsert(vec![
                record("a-0", "a.txt", vec![1.0, 0.0]),
                record("b-0", "b.txt", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let documents = store.list_documents().await.unwrap();
        let mut names: Vec<String> = documents.into_iter().map(|d| d.filename).collect();
        names.sort();
        assert_eq!(names, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }
}

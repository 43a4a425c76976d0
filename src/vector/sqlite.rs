//! SQLite-backed vector store.
//!
//! Local fallback used when no hosted index is configured: chunk text and
//! metadata in SQLite, serialized embeddings scanned with brute-force cosine
//! similarity. No external server required.

use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use crate::core::errors::ApiError;

use super::batch::{plan_batches, MAX_BATCH_BYTES};
use super::store::{cosine_similarity, VectorStore};
use super::types::{DocumentSummary, RetrievalMatch, StoredVector, VectorMetadata};

pub struct SqliteVectorStore {
    pool: SqlitePool,
    dimension: usize,
    #[allow(dead_code)]
    db_path: PathBuf,
}

impl SqliteVectorStore {
    pub async fn new(db_path: PathBuf, dimension: usize) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::storage)?;

        let store = Self {
            pool,
            dimension,
            db_path,
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS document_chunks (
                id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                total_chunks INTEGER NOT NULL,
                page_number INTEGER,
                start_position INTEGER,
                end_position INTEGER,
                text TEXT NOT NULL,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::storage)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_filename ON document_chunks(filename)")
            .execute(&self.pool)
            .await
            .map_err(ApiError::storage)?;

        Ok(())
    }

    /// Serialize embedding to bytes (little-endian f32).
    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    async fn upsert_batch(&self, batch: Vec<StoredVector>) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::storage)?;

        for record in &batch {
            if record.values.len() != self.dimension {
                return Err(ApiError::Storage(format!(
                    "embedding dimension {} does not match index dimension {}",
                    record.values.len(),
                    self.dimension
                )));
            }
            let blob = Self::serialize_embedding(&record.values);
            sqlx::query(
                "INSERT OR REPLACE INTO document_chunks
                 (id, filename, chunk_index, total_chunks, page_number,
                  start_position, end_position, text, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )
            .bind(&record.id)
            .bind(&record.metadata.filename)
            .bind(record.metadata.chunk_index as i64)
            .bind(record.metadata.total_chunks as i64)
            .bind(record.metadata.page_number.map(|v| v as i64))
            .bind(record.metadata.start_position.map(|v| v as i64))
            .bind(record.metadata.end_position.map(|v| v as i64))
            .bind(&record.metadata.text)
            .bind(&blob)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::storage)?;
        }

        tx.commit().await.map_err(ApiError::storage)?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn upsert(&self, records: Vec<StoredVector>) -> Result<(), ApiError> {
        let batches = plan_batches(records, MAX_BATCH_BYTES);
        let total = batches.len();
        for (i, batch) in batches.into_iter().enumerate() {
            let count = batch.len();
            self.upsert_batch(batch).await?;
            tracing::debug!("stored batch {}/{} ({} vectors)", i + 1, total, count);
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filenames: Option<&[String]>,
    ) -> Result<Vec<RetrievalMatch>, ApiError> {
        let rows = sqlx::query(
            "SELECT id, filename, chunk_index, total_chunks, page_number,
                    start_position, end_position, text, embedding
             FROM document_chunks",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::storage)?;

        let mut scored: Vec<RetrievalMatch> = rows
            .iter()
            .filter_map(|row| {
                let filename: String = row.get("filename");
                if let Some(allowed) = filenames {
                    if !allowed.contains(&filename) {
                        return None;
                    }
                }

                let embedding_bytes: Vec<u8> = row.get("embedding");
                let stored = Self::deserialize_embedding(&embedding_bytes);
                let score = cosine_similarity(vector, &stored);

                let chunk_index: i64 = row.get("chunk_index");
                let total_chunks: i64 = row.get("total_chunks");
                let page_number: Option<i64> = row.get("page_number");
                let start_position: Option<i64> = row.get("start_position");
                let end_position: Option<i64> = row.get("end_position");

                Some(RetrievalMatch::from_metadata(
                    row.get("id"),
                    score,
                    VectorMetadata {
                        text: row.get("text"),
                        filename,
                        chunk_index: chunk_index as usize,
                        total_chunks: total_chunks as usize,
                        page_number: page_number.map(|v| v as u32),
                        start_position: start_position.map(|v| v as usize),
                        end_position: end_position.map(|v| v as usize),
                    },
                ))
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

    /// SQLite can list documents directly, so the neutral-vector
    /// approximation from the trait default is replaced with a real scan.
    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, ApiError> {
        let rows = sqlx::query(
            "SELECT filename, MAX(total_chunks) AS total_chunks
             FROM document_chunks GROUP BY filename ORDER BY filename",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::storage)?;

        Ok(rows
            .iter()
            .map(|row| {
                let total_chunks: i64 = row.get("total_chunks");
                DocumentSummary {
                    filename: row.get("filename"),
                    total_chunks: total_chunks as usize,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store(dimension: usize) -> SqliteVectorStore {
        let tmp = std::env::temp_dir().join(format!("docqa-vec-test-{}.db", uuid::Uuid::new_v4()));
        SqliteVectorStore::new(tmp, dimension).await.unwrap()
    }

    fn record(id: &str, filename: &str, values: Vec<f32>) -> StoredVector {
        StoredVector {
            id: id.to_string(),
            values,
            metadata: VectorMetadata {
                text: format!("text of {id}"),
                filename: filename.to_string(),
                chunk_index: 0,
                total_chunks: 2,
                page_number: Some(1),
                start_position: Some(0),
                end_position: Some(10),
            },
        }
    }

    #[tokio::test]
    async fn upsert_and_query_round_trip() {
        let store = test_store(3).await;
        store
            .upsert(vec![
                record("c1", "a.txt", vec![1.0, 0.0, 0.0]),
                record("c2", "b.txt", vec![0.0, 1.0, 0.0]),
            ])
            .await
            .unwrap();

        let matches = store.query(&[1.0, 0.0, 0.0], 10, None).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "c1");
        assert!(matches[0].score > 0.99);
        assert_eq!(matches[0].page_number, Some(1));
    }

    #[tokio::test]
    async fn reupsert_overwrites_in_place() {
        let store = test_store(2).await;
        store
            .upsert(vec![record("c1", "a.txt", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert(vec![record("c1", "a.txt", vec![0.0, 1.0])])
            .await
            .unwrap();

        let matches = store.query(&[0.0, 1.0], 10, None).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].score > 0.99);
    }

    #[tokio::test]
    async fn dimension_mismatch_is_a_storage_error() {
        let store = test_store(4).await;
        let err = store
            .upsert(vec![record("c1", "a.txt", vec![1.0, 0.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)));
    }

    #[tokio::test]
    async fn list_documents_scans_distinct_filenames() {
        let store = test_store(2).await;
        store
            .upsert(vec![
                record("a-0", "a.txt", vec![1.0, 0.0]),
                record("a-1", "a.txt", vec![0.5, 0.5]),
                record("b-0", "b.txt", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let documents = store.list_documents().await.unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].filename, "a.txt");
        assert_eq!(documents[0].total_chunks, 2);
    }
}

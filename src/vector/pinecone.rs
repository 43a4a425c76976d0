//! Hosted vector backend over the Pinecone REST API.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use async_trait::async_trait;

use crate::core::errors::ApiError;

use super::batch::{plan_batches, MAX_BATCH_BYTES};
use super::store::VectorStore;
use super::types::{RetrievalMatch, StoredVector, VectorMetadata};

pub struct PineconeStore {
    client: Client,
    api_key: String,
    index_host: String,
    index_name: String,
    dimension: usize,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<PineconeMatch>,
}

#[derive(Deserialize)]
struct PineconeMatch {
    id: String,
    #[serde(default)]
    score: Option<f32>,
    #[serde(default)]
    metadata: Option<VectorMetadata>,
}

impl PineconeStore {
    pub fn new(api_key: String, index_host: String, index_name: String, dimension: usize) -> Self {
        Self {
            client: Client::new(),
            api_key,
            index_host: index_host.trim_end_matches('/').to_string(),
            index_name,
            dimension,
        }
    }

    async fn upsert_batch(&self, batch: &[StoredVector]) -> Result<(), ApiError> {
        let url = format!("{}/vectors/upsert", self.index_host);
        let body = json!({ "vectors": batch });

        let res = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::storage)?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            tracing::error!("Pinecone upsert error ({}): {}", status, detail);
            return Err(ApiError::Storage(format!(
                "upsert to index {} rejected with status {}",
                self.index_name, status
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn upsert(&self, records: Vec<StoredVector>) -> Result<(), ApiError> {
        // A failed batch aborts the remainder: no partial commit is retried
        // or skipped within one document's chunk set.
        let batches = plan_batches(records, MAX_BATCH_BYTES);
        let total = batches.len();
        for (i, batch) in batches.iter().enumerate() {
            let bytes: usize = batch.iter().map(StoredVector::estimated_bytes).sum();
            self.upsert_batch(batch).await?;
            tracing::debug!(
                "batch {}/{} uploaded ({} vectors, ~{} bytes)",
                i + 1,
                total,
                batch.len(),
                bytes
            );
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filenames: Option<&[String]>,
    ) -> Result<Vec<RetrievalMatch>, ApiError> {
        let url = format!("{}/query", self.index_host);
        let mut body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
        });
        if let Some(allowed) = filenames {
            body["filter"] = json!({ "filename": { "$in": allowed } });
        }

        let res = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::storage)?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            tracing::error!("Pinecone query error ({}): {}", status, detail);
            return Err(ApiError::Storage(format!(
                "query against index {} rejected with status {}",
                self.index_name, status
            )));
        }

        let payload: QueryResponse = res.json().await.map_err(ApiError::storage)?;
        Ok(payload
            .matches
            .into_iter()
            .filter_map(|m| {
                let metadata = m.metadata?;
                Some(RetrievalMatch::from_metadata(
                    m.id,
                    m.score.unwrap_or(0.0),
                    metadata,
                ))
            })
            .collect())
    }
}

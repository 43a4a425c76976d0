use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chunker::{Chunker, DocumentChunk};
use crate::core::errors::ApiError;
use crate::drive::DriveClient;
use crate::extract::TextExtractor;
use crate::llm::LlmProvider;
use crate::vector::{StoredVector, VectorStore};

/// MIME types the auto-indexer will pick up from Drive.
pub const SUPPORTED_MIME_TYPES: [&str; 6] = [
    "application/vnd.google-apps.document",
    "application/vnd.google-apps.presentation",
    "application/vnd.google-apps.spreadsheet",
    "application/pdf",
    "text/plain",
    "text/csv",
];

const AUTO_INDEX_PAGE_SIZE: usize = 1000;

/// One successfully ingested document as reported to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedDocument {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub chunks_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
}

/// Drive ingestion orchestrator.
///
/// Files are processed sequentially; a failure on one file is logged and
/// skipped so the rest of the batch still lands. Callers distinguish a
/// partial failure from success by comparing result and input counts.
pub struct IngestPipeline {
    drive: Arc<dyn DriveClient>,
    extractor: Arc<dyn TextExtractor>,
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn VectorStore>,
    chunker: Chunker,
}

impl IngestPipeline {
    pub fn new(
        drive: Arc<dyn DriveClient>,
        extractor: Arc<dyn TextExtractor>,
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStore>,
        chunker: Chunker,
    ) -> Self {
        Self {
            drive,
            extractor,
            provider,
            store,
            chunker,
        }
    }

    pub async fn ingest(&self, file_ids: &[String]) -> Vec<ProcessedDocument> {
        let mut processed = Vec::new();
        for file_id in file_ids {
            match self.ingest_one(file_id).await {
                Ok(doc) => {
                    tracing::info!("processed {} ({} chunks)", doc.name, doc.chunks_count);
                    processed.push(doc);
                }
                Err(err) => {
                    tracing::error!("failed to process file {}: {}", file_id, err);
                }
            }
        }
        processed
    }

    /// List all remote files, keep the supported MIME types and run them
    /// through the same per-file pipeline.
    pub async fn auto_index(&self) -> Result<Vec<ProcessedDocument>, ApiError> {
        let files = self.drive.list_files(AUTO_INDEX_PAGE_SIZE, None).await?;
        let file_ids: Vec<String> = files
            .into_iter()
            .filter(|f| SUPPORTED_MIME_TYPES.contains(&f.mime_type.as_str()))
            .map(|f| f.id)
            .collect();
        tracing::info!("auto-indexing {} supported Drive files", file_ids.len());
        Ok(self.ingest(&file_ids).await)
    }

    async fn ingest_one(&self, file_id: &str) -> Result<ProcessedDocument, ApiError> {
        let metadata = self.drive.get_file_metadata(file_id).await?;
        let bytes = self
            .drive
            .get_file_content(file_id, &metadata.mime_type)
            .await?;

        let extracted = self
            .extractor
            .extract(&bytes, &metadata.mime_type, &metadata.name)
            .await?;

        let chunks = self
            .chunker
            .chunk(&extracted.text, &metadata.name, &extracted.pages);
        if chunks.is_empty() {
            return Err(ApiError::Extraction(format!(
                "no indexable text in {}",
                metadata.name
            )));
        }

        let stored = self.embed_and_store(&chunks).await?;

        Ok(ProcessedDocument {
            id: metadata.id,
            name: metadata.name,
            mime_type: metadata.mime_type,
            chunks_count: stored,
            processing_error: None,
            modified_time: metadata.modified_time,
            web_view_link: metadata.web_view_link,
        })
    }

    /// Embed chunks one at a time and upsert the results in size-bounded
    /// batches. A chunk that fails to embed is dropped rather than aborting
    /// the document; rate-limit failures abort the document so the whole
    /// batch isn't burned against a throttled backend.
    async fn embed_and_store(&self, chunks: &[DocumentChunk]) -> Result<usize, ApiError> {
        let mut records = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            match self.provider.embed(&chunk.text).await {
                Ok(values) => records.push(StoredVector::from_chunk(chunk, values)),
                Err(err) if err.is_rate_limit() => return Err(err),
                Err(err) => {
                    tracing::warn!("skipping chunk {}: {}", chunk.id, err);
                }
            }
        }

        if records.is_empty() {
            return Err(ApiError::Internal(
                "embedding failed for every chunk".to_string(),
            ));
        }

        let count = records.len();
        self.store.upsert(records).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::drive::DriveFile;
    use crate::extract::{ExtractedText, PlainTextExtractor};
    use crate::vector::MemoryVectorStore;

    struct MockDrive {
        files: HashMap<String, (DriveFile, Vec<u8>)>,
    }

    impl MockDrive {
        fn new(entries: Vec<(&str, &str, &str, &str)>) -> Self {
            let files = entries
                .into_iter()
                .map(|(id, name, mime, body)| {
                    (
                        id.to_string(),
                        (
                            DriveFile {
                                id: id.to_string(),
                                name: name.to_string(),
                                mime_type: mime.to_string(),
                                size: None,
                                modified_time: None,
                                web_view_link: None,
                            },
                            body.as_bytes().to_vec(),
                        ),
                    )
                })
                .collect();
            Self { files }
        }
    }

    #[async_trait]
    impl DriveClient for MockDrive {
        async fn list_files(
            &self,
            _page_size: usize,
            _query: Option<&str>,
        ) -> Result<Vec<DriveFile>, ApiError> {
            Ok(self.files.values().map(|(f, _)| f.clone()).collect())
        }

        async fn get_file_metadata(&self, file_id: &str) -> Result<DriveFile, ApiError> {
            self.files
                .get(file_id)
                .map(|(f, _)| f.clone())
                .ok_or_else(|| ApiError::NotFound(file_id.to_string()))
        }

        async fn get_file_content(
            &self,
            file_id: &str,
            _mime_type: &str,
        ) -> Result<Vec<u8>, ApiError> {
            self.files
                .get(file_id)
                .map(|(_, b)| b.clone())
                .ok_or_else(|| ApiError::NotFound(file_id.to_string()))
        }
    }

    /// Extractor that fails for a marked filename, to exercise the
    /// partial-failure path.
    struct FailingExtractor;

    #[async_trait]
    impl TextExtractor for FailingExtractor {
        async fn extract(
            &self,
            bytes: &[u8],
            _mime_type: &str,
            filename: &str,
        ) -> Result<ExtractedText, ApiError> {
            if filename.contains("corrupt") {
                return Err(ApiError::Extraction("unreadable bytes".to_string()));
            }
            Ok(crate::extract::split_into_pages(
                String::from_utf8_lossy(bytes).into_owned(),
            ))
        }
    }

    struct UnitProvider;

    #[async_trait]
    impl LlmProvider for UnitProvider {
        fn name(&self) -> &str {
            "test"
        }

        async fn health_check(&self) -> Result<bool, ApiError> {
            Ok(true)
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, ApiError> {
            Ok(vec![1.0, 0.0])
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ApiError> {
            Ok(String::new())
        }
    }

    fn pipeline_with(
        drive: MockDrive,
        extractor: Arc<dyn TextExtractor>,
    ) -> (IngestPipeline, Arc<MemoryVectorStore>) {
        let store = Arc::new(MemoryVectorStore::new(2));
        let pipeline = IngestPipeline::new(
            Arc::new(drive),
            extractor,
            Arc::new(UnitProvider),
            store.clone(),
            Chunker::new(1000, 200),
        );
        (pipeline, store)
    }

    #[tokio::test]
    async fn one_failing_file_does_not_block_the_rest() {
        let drive = MockDrive::new(vec![
            ("f1", "first.txt", "text/plain", "Alpha document body."),
            ("f2", "corrupt.txt", "text/plain", "whatever"),
            ("f3", "third.txt", "text/plain", "Gamma document body."),
        ]);
        let (pipeline, _store) = pipeline_with(drive, Arc::new(FailingExtractor));

        let ids = vec!["f1".to_string(), "f2".to_string(), "f3".to_string()];
        let processed = pipeline.ingest(&ids).await;

        let names: Vec<&str> = processed.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["first.txt", "third.txt"]);
    }

    #[tokio::test]
    async fn unknown_file_id_is_skipped() {
        let drive = MockDrive::new(vec![("f1", "only.txt", "text/plain", "Body text.")]);
        let (pipeline, _store) = pipeline_with(drive, Arc::new(PlainTextExtractor));

        let ids = vec!["missing".to_string(), "f1".to_string()];
        let processed = pipeline.ingest(&ids).await;
        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].id, "f1");
    }

    #[tokio::test]
    async fn empty_document_fails_that_file() {
        let drive = MockDrive::new(vec![("f1", "empty.txt", "text/plain", "   ")]);
        let (pipeline, store) = pipeline_with(drive, Arc::new(PlainTextExtractor));

        let processed = pipeline.ingest(&["f1".to_string()]).await;
        assert!(processed.is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn reingestion_is_idempotent_per_chunk_id() {
        let drive = MockDrive::new(vec![(
            "f1",
            "report.txt",
            "text/plain",
            "One sentence here. Another sentence there.",
        )]);
        let (pipeline, store) = pipeline_with(drive, Arc::new(PlainTextExtractor));

        let ids = vec!["f1".to_string()];
        let first = pipeline.ingest(&ids).await;
        let count_after_first = store.len();
        let second = pipeline.ingest(&ids).await;

        assert_eq!(first[0].chunks_count, second[0].chunks_count);
        assert_eq!(store.len(), count_after_first);
    }

    #[tokio::test]
    async fn auto_index_filters_unsupported_mime_types() {
        let drive = MockDrive::new(vec![
            ("f1", "doc.txt", "text/plain", "Plain body."),
            ("f2", "scan.png", "image/png", "binary"),
        ]);
        let (pipeline, _store) = pipeline_with(drive, Arc::new(PlainTextExtractor));

        let processed = pipeline.auto_index().await.unwrap();
        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].name, "doc.txt");
    }
}

use std::sync::Arc;

use crate::chunker::Chunker;
use crate::core::config::AppConfig;
use crate::core::errors::ApiError;
use crate::drive::{DriveClient, GoogleDriveClient};
use crate::extract::{PlainTextExtractor, TextExtractor};
use crate::ingest::IngestPipeline;
use crate::llm::{self, LlmProvider};
use crate::rag::{RagAnswerer, SearchService};
use crate::vector::{PineconeStore, SqliteVectorStore, VectorStore};

/// Global application state shared across all routes.
///
/// Holds the configured provider, the vector store and the services built
/// on top of them. Everything here is immutable after startup.
pub struct AppState {
    pub config: AppConfig,
    pub provider: Arc<dyn LlmProvider>,
    pub store: Arc<dyn VectorStore>,
    pub answerer: RagAnswerer,
    pub search: SearchService,
    pub pipeline: IngestPipeline,
}

impl AppState {
    pub async fn initialize(config: AppConfig) -> Result<Arc<Self>, ApiError> {
        let provider = llm::provider_from_config(&config);
        tracing::info!("active LLM provider: {}", provider.name());

        let store = build_store(&config).await?;

        let drive: Arc<dyn DriveClient> = Arc::new(GoogleDriveClient::new(
            config.drive_access_token.clone().unwrap_or_default(),
        ));
        let extractor: Arc<dyn TextExtractor> = Arc::new(PlainTextExtractor);
        let chunker = Chunker::new(config.chunk_size, config.chunk_overlap);

        let answerer = RagAnswerer::new(provider.clone(), store.clone());
        let search = SearchService::new(provider.clone(), store.clone());
        let pipeline = IngestPipeline::new(drive, extractor, provider.clone(), store.clone(), chunker);

        Ok(Arc::new(AppState {
            config,
            provider,
            store,
            answerer,
            search,
            pipeline,
        }))
    }
}

async fn build_store(config: &AppConfig) -> Result<Arc<dyn VectorStore>, ApiError> {
    if let (Some(api_key), Some(host)) = (&config.pinecone_api_key, &config.pinecone_index_host) {
        tracing::info!("using Pinecone index {}", config.pinecone_index_name);
        return Ok(Arc::new(PineconeStore::new(
            api_key.clone(),
            host.clone(),
            config.pinecone_index_name.clone(),
            config.embedding_dimension,
        )));
    }

    tracing::warn!("Pinecone not configured; falling back to the local sqlite vector store");
    let _ = std::fs::create_dir_all(&config.data_dir);
    let store = SqliteVectorStore::new(
        config.data_dir.join("vectors.db"),
        config.embedding_dimension,
    )
    .await?;
    Ok(Arc::new(store))
}

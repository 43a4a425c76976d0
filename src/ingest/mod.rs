//! Document ingestion: Drive file batches through extraction, chunking,
//! embedding and vector storage.

pub mod pipeline;

pub use pipeline::{IngestPipeline, ProcessedDocument};

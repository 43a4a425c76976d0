//! Vector storage: size-bounded batched upserts, similarity queries and
//! document listing over interchangeable backends.

pub mod batch;
pub mod memory;
pub mod pinecone;
pub mod sqlite;
pub mod store;
pub mod types;

pub use batch::{plan_batches, MAX_BATCH_BYTES};
pub use memory::MemoryVectorStore;
pub use pinecone::PineconeStore;
pub use sqlite::SqliteVectorStore;
pub use store::VectorStore;
pub use types::{DocumentSummary, RetrievalMatch, StoredVector, VectorMetadata};

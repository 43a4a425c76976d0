//! Document question-answering backend.
//!
//! Retrieval-augmented generation over user documents: Drive files are
//! extracted, chunked, embedded and stored in a vector index; questions are
//! answered by retrieving the closest chunks and delegating to a pluggable
//! LLM backend with source citations.

pub mod chunker;
pub mod core;
pub mod drive;
pub mod extract;
pub mod ingest;
pub mod llm;
pub mod rag;
pub mod server;
pub mod state;
pub mod vector;

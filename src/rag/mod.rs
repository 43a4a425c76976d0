//! Retrieval-augmented generation.
//!
//! `RagAnswerer` answers questions from retrieved chunks with citations;
//! `SearchService` is the standalone lexical-blend search used by the search
//! endpoint.

pub mod answerer;
pub mod search;

pub use answerer::{Answer, AnswerOptions, ChatTurn, Citation, RagAnswerer};
pub use search::{SearchHit, SearchService};

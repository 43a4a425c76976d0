use async_trait::async_trait;

use crate::core::errors::ApiError;

/// One backend serving both embeddings and chat completions.
///
/// Exactly one implementation is active per process, selected at startup and
/// injected wherever embeddings or generation are needed. Embedding
/// dimensionality is a property of the backend; callers never resize or pad
/// vectors.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g. "ollama", "gemini"), used in error reporting.
    fn name(&self) -> &str;

    /// Check whether the backend is reachable.
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// Embed a single text into a fixed-length vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError>;

    /// Generate a chat completion for an assembled prompt.
    async fn generate(&self, prompt: &str) -> Result<String, ApiError>;
}

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the document QA pipeline.
///
/// Raw upstream error bodies are logged server-side and never returned to
/// the client; the response carries only the categorized message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Source bytes unreadable or unsupported MIME type. Never retried.
    #[error("extraction failed: {0}")]
    Extraction(String),
    /// Provider signalled quota exhaustion / HTTP 429. The embedding path
    /// retries these with backoff before surfacing.
    #[error("API rate limit exceeded for {provider}. Please wait a moment and try again.")]
    RateLimited { provider: String },
    /// Network or connection failure to a configured provider. Carries the
    /// provider name so the operator knows which backend to check.
    #[error("provider {provider} unavailable: {detail}")]
    ProviderUnavailable { provider: String, detail: String },
    /// Vector backend rejected an upsert or query.
    #[error("vector store error: {0}")]
    Storage(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    pub fn storage<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Storage(err.to_string())
    }

    pub fn unavailable<E: std::fmt::Display>(provider: &str, err: E) -> Self {
        ApiError::ProviderUnavailable {
            provider: provider.to_string(),
            detail: err.to_string(),
        }
    }

    pub fn rate_limited(provider: &str) -> Self {
        ApiError::RateLimited {
            provider: provider.to_string(),
        }
    }

    /// True for quota/429-class failures, the only class the embedding path
    /// retries.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) | ApiError::Extraction(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ProviderUnavailable { .. }
            | ApiError::Storage(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_classification() {
        assert!(ApiError::rate_limited("gemini").is_rate_limit());
        assert!(!ApiError::unavailable("ollama", "connection refused").is_rate_limit());
        assert!(!ApiError::Storage("bad dimension".into()).is_rate_limit());
    }
}

//! Default hosted backend (Google Gemini).
//!
//! The only adapter with a retry path: quota/429 responses on the embedding
//! endpoint are retried with backoff before surfacing.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::errors::ApiError;

use super::provider::LlmProvider;
use super::retry::{retry_rate_limited, MAX_RETRIES};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone)]
pub struct GeminiProvider {
    api_key: String,
    embedding_model: String,
    chat_model: String,
    base_url: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, embedding_model: String, chat_model: String) -> Self {
        Self {
            api_key,
            embedding_model,
            chat_model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    fn is_quota_error(status: reqwest::StatusCode, body: &str) -> bool {
        status.as_u16() == 429
            || body.contains("RESOURCE_EXHAUSTED")
            || body.contains("Quota exceeded")
    }

    async fn embed_once(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        let url = format!(
            "{}/v1beta/models/{}:embedContent?key={}",
            self.base_url, self.embedding_model, self.api_key
        );
        let body = json!({
            "model": format!("models/{}", self.embedding_model),
            "content": { "parts": [{ "text": text }] },
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::unavailable(self.name(), e))?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            tracing::error!("Gemini embedContent error ({}): {}", status, detail);
            if Self::is_quota_error(status, &detail) {
                return Err(ApiError::rate_limited(self.name()));
            }
            return Err(ApiError::unavailable(self.name(), status));
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| ApiError::unavailable(self.name(), e))?;
        let values = payload["embedding"]["values"]
            .as_array()
            .ok_or_else(|| {
                ApiError::unavailable(self.name(), "embedding values missing from response")
            })?
            .iter()
            .filter_map(|v| v.as_f64().map(|f| f as f32))
            .collect();

        Ok(values)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/v1beta/models?key={}", self.base_url, self.api_key);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        retry_rate_limited(MAX_RETRIES, || self.embed_once(text)).await
    }

    async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.chat_model, self.api_key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::unavailable(self.name(), e))?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            tracing::error!("Gemini generateContent error ({}): {}", status, detail);
            if Self::is_quota_error(status, &detail) {
                return Err(ApiError::rate_limited(self.name()));
            }
            return Err(ApiError::unavailable(self.name(), status));
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| ApiError::unavailable(self.name(), e))?;

        Ok(payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }
}

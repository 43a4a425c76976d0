use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::errors::ApiError;

use super::provider::LlmProvider;

#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    embedding_model: String,
    chat_model: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(base_url: String, embedding_model: String, chat_model: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            embedding_model,
            chat_model,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let body = json!({
            "model": self.embedding_model,
            "prompt": text,
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
            tracing::error!("Ollama embeddings error ({}): {}", status, detail);
            if status.as_u16() == 429 {
                return Err(ApiError::rate_limited(self.name()));
            }
            return Err(ApiError::unavailable(self.name(), status));
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| ApiError::unavailable(self.name(), e))?;
        let embedding = payload["embedding"]
            .as_array()
            .ok_or_else(|| {
                ApiError::unavailable(self.name(), "embedding missing from response")
            })?
            .iter()
            .filter_map(|v| v.as_f64().map(|f| f as f32))
            .collect();

        Ok(embedding)
    }

    async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = json!({
            "model": self.chat_model,
            "prompt": prompt,
            "stream": false,
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
            tracing::error!("Ollama generate error ({}): {}", status, detail);
            if status.as_u16() == 429 {
                return Err(ApiError::rate_limited(self.name()));
            }
            return Err(ApiError::unavailable(self.name(), status));
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| ApiError::unavailable(self.name(), e))?;

        Ok(payload["response"].as_str().unwrap_or_default().to_string())
    }
}

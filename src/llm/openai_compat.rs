//! Adapter for backends speaking the OpenAI REST dialect.
//!
//! OpenAI itself, FastChat, vLLM and Together AI all expose
//! `/v1/embeddings` and `/v1/chat/completions`, so one adapter covers the
//! four of them; the constructors below pin down host, auth and models per
//! backend.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::errors::ApiError;

use super::provider::LlmProvider;

#[derive(Clone)]
pub struct OpenAiCompatProvider {
    name: &'static str,
    base_url: String,
    api_key: Option<String>,
    embedding_model: String,
    chat_model: String,
    client: Client,
}

impl OpenAiCompatProvider {
    pub fn openai(api_key: String, embedding_model: String, chat_model: String) -> Self {
        Self::new(
            "openai",
            "https://api.openai.com".to_string(),
            Some(api_key),
            embedding_model,
            chat_model,
        )
    }

    pub fn together(api_key: String, embedding_model: String, chat_model: String) -> Self {
        Self::new(
            "together",
            "https://api.together.xyz".to_string(),
            Some(api_key),
            embedding_model,
            chat_model,
        )
    }

    pub fn fastchat(host: String, embedding_model: String, chat_model: String) -> Self {
        Self::new("fastchat", host, None, embedding_model, chat_model)
    }

    pub fn vllm(host: String, embedding_model: String, chat_model: String) -> Self {
        Self::new("vllm", host, None, embedding_model, chat_model)
    }

    fn new(
        name: &'static str,
        base_url: String,
        api_key: Option<String>,
        embedding_model: String,
        chat_model: String,
    ) -> Self {
        Self {
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            embedding_model,
            chat_model,
            client: Client::new(),
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let mut builder = self.client.get(format!("{}/v1/models", self.base_url));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        match builder.send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        let body = json!({
            "model": self.embedding_model,
            "input": [text],
        });

        let res = self
            .post("/v1/embeddings")
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::unavailable(self.name, e))?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            tracing::error!("{} embeddings error ({}): {}", self.name, status, detail);
            if status.as_u16() == 429 {
                return Err(ApiError::rate_limited(self.name));
            }
            return Err(ApiError::unavailable(self.name, status));
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| ApiError::unavailable(self.name, e))?;
        let embedding = payload["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| ApiError::unavailable(self.name, "embedding missing from response"))?
            .iter()
            .filter_map(|v| v.as_f64().map(|f| f as f32))
            .collect();

        Ok(embedding)
    }

    async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        let body = json!({
            "model": self.chat_model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.7,
            "max_tokens": 2000,
        });

        let res = self
            .post("/v1/chat/completions")
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::unavailable(self.name, e))?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            tracing::error!("{} chat error ({}): {}", self.name, status, detail);
            if status.as_u16() == 429 {
                return Err(ApiError::rate_limited(self.name));
            }
            return Err(ApiError::unavailable(self.name, status));
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| ApiError::unavailable(self.name, e))?;

        Ok(payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }
}

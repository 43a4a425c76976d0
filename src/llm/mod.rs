//! LLM provider abstraction.
//!
//! One [`LlmProvider`] trait covering embeddings and chat completions, with
//! one adapter per backend family. The active backend is picked once at
//! startup from configuration and injected; there is no call-time fallback
//! between providers.

pub mod gemini;
pub mod ollama;
pub mod openai_compat;
pub mod provider;
pub mod retry;

use std::sync::Arc;

pub use provider::LlmProvider;

use crate::core::config::{AppConfig, ProviderKind};

use gemini::GeminiProvider;
use ollama::OllamaProvider;
use openai_compat::OpenAiCompatProvider;

/// Build the configured provider. `AppConfig::from_env` has already verified
/// that the required key for the selected backend is present.
pub fn provider_from_config(config: &AppConfig) -> Arc<dyn LlmProvider> {
    match config.provider {
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(
            config.ollama_host.clone(),
            config.ollama_embedding_model.clone(),
            config.ollama_chat_model.clone(),
        )),
        ProviderKind::FastChat => Arc::new(OpenAiCompatProvider::fastchat(
            config.fastchat_host.clone(),
            config.fastchat_embedding_model.clone(),
            config.fastchat_chat_model.clone(),
        )),
        ProviderKind::OpenAi => Arc::new(OpenAiCompatProvider::openai(
            config.openai_api_key.clone().unwrap_or_default(),
            config.openai_embedding_model.clone(),
            config.openai_chat_model.clone(),
        )),
        ProviderKind::Vllm => Arc::new(OpenAiCompatProvider::vllm(
            config.vllm_host.clone(),
            config.vllm_embedding_model.clone(),
            config.vllm_chat_model.clone(),
        )),
        ProviderKind::Together => Arc::new(OpenAiCompatProvider::together(
            config.together_api_key.clone().unwrap_or_default(),
            config.together_embedding_model.clone(),
            config.together_chat_model.clone(),
        )),
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(
            config.google_api_key.clone().unwrap_or_default(),
            config.gemini_embedding_model.clone(),
            config.gemini_chat_model.clone(),
        )),
    }
}

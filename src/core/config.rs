use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is required when {context}")]
    MissingVar {
        var: &'static str,
        context: &'static str,
    },
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// The LLM backend active for this process.
///
/// Resolved once at startup from the `USE_*` flags; precedence follows the
/// flag order below and the first match wins. With no flag set, the hosted
/// Gemini backend is the default and a missing `GOOGLE_API_KEY` is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
    FastChat,
    OpenAi,
    Vllm,
    Together,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "ollama",
            ProviderKind::FastChat => "fastchat",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Vllm => "vllm",
            ProviderKind::Together => "together",
            ProviderKind::Gemini => "gemini",
        }
    }
}

/// Process configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub provider: ProviderKind,

    // Chunking
    pub chunk_size: usize,
    pub chunk_overlap: usize,

    // Ollama
    pub ollama_host: String,
    pub ollama_embedding_model: String,
    pub ollama_chat_model: String,

    // FastChat
    pub fastchat_host: String,
    pub fastchat_embedding_model: String,
    pub fastchat_chat_model: String,

    // OpenAI
    pub openai_api_key: Option<String>,
    pub openai_embedding_model: String,
    pub openai_chat_model: String,

    // vLLM
    pub vllm_host: String,
    pub vllm_embedding_model: String,
    pub vllm_chat_model: String,

    // Together AI
    pub together_api_key: Option<String>,
    pub together_embedding_model: String,
    pub together_chat_model: String,

    // Gemini (default hosted backend)
    pub google_api_key: Option<String>,
    pub gemini_embedding_model: String,
    pub gemini_chat_model: String,

    // Vector store
    pub pinecone_api_key: Option<String>,
    pub pinecone_index_host: Option<String>,
    pub pinecone_index_name: String,
    pub embedding_dimension: usize,

    // Google Drive (credentials are consumed as given; OAuth lives elsewhere)
    pub drive_access_token: Option<String>,

    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = resolve_provider()?;

        let openai_api_key = env_opt("OPENAI_API_KEY");
        if provider == ProviderKind::OpenAi && openai_api_key.is_none() {
            return Err(ConfigError::MissingVar {
                var: "OPENAI_API_KEY",
                context: "USE_OPENAI is set",
            });
        }

        let together_api_key = env_opt("TOGETHER_API_KEY");
        if provider == ProviderKind::Together && together_api_key.is_none() {
            return Err(ConfigError::MissingVar {
                var: "TOGETHER_API_KEY",
                context: "USE_TOGETHER is set",
            });
        }

        let google_api_key = env_opt("GOOGLE_API_KEY");
        if provider == ProviderKind::Gemini && google_api_key.is_none() {
            return Err(ConfigError::MissingVar {
                var: "GOOGLE_API_KEY",
                context: "no provider flag is set and Gemini is the default",
            });
        }

        let data_dir = PathBuf::from(env_or("DOCQA_DATA_DIR", "./data"));
        let log_dir = data_dir.join("logs");

        Ok(AppConfig {
            port: env_parse("PORT", 8080)?,
            provider,
            chunk_size: env_parse("CHUNK_SIZE", 1000)?,
            chunk_overlap: env_parse("CHUNK_OVERLAP", 200)?,
            ollama_host: env_or("OLLAMA_HOST", "http://localhost:11434"),
            ollama_embedding_model: env_or("OLLAMA_EMBEDDING_MODEL", "nomic-embed-text:latest"),
            ollama_chat_model: env_or("OLLAMA_CHAT_MODEL", "llama3:latest"),
            fastchat_host: env_or("FASTCHAT_HOST", "http://localhost:8001"),
            fastchat_embedding_model: env_or("FASTCHAT_EMBEDDING_MODEL", "all-MiniLM-L6-v2"),
            fastchat_chat_model: env_or("FASTCHAT_CHAT_MODEL", "vicuna-7b-v1.5"),
            openai_api_key,
            openai_embedding_model: env_or("OPENAI_EMBEDDING_MODEL", "text-embedding-3-small"),
            openai_chat_model: env_or("OPENAI_CHAT_MODEL", "gpt-3.5-turbo"),
            vllm_host: env_or("VLLM_HOST", "http://localhost:8000"),
            vllm_embedding_model: env_or("VLLM_EMBEDDING_MODEL", "BAAI/bge-small-en-v1.5"),
            vllm_chat_model: env_or("VLLM_CHAT_MODEL", "microsoft/DialoGPT-medium"),
            together_api_key,
            together_embedding_model: env_or("TOGETHER_EMBEDDING_MODEL", "BAAI/bge-base-en-v1.5"),
            together_chat_model: env_or(
                "TOGETHER_CHAT_MODEL",
                "mistralai/Mixtral-8x7B-Instruct-v0.1",
            ),
            google_api_key,
            gemini_embedding_model: env_or("GEMINI_EMBEDDING_MODEL", "text-embedding-004"),
            gemini_chat_model: env_or("GEMINI_CHAT_MODEL", "gemini-1.5-pro"),
            pinecone_api_key: env_opt("PINECONE_API_KEY"),
            pinecone_index_host: env_opt("PINECONE_INDEX_HOST"),
            pinecone_index_name: env_or("PINECONE_INDEX_NAME", "document-qa-index"),
            embedding_dimension: env_parse("EMBEDDING_DIMENSION", 768)?,
            drive_access_token: env_opt("GOOGLE_ACCESS_TOKEN"),
            data_dir,
            log_dir,
        })
    }
}

fn resolve_provider() -> Result<ProviderKind, ConfigError> {
    if env_flag("USE_OLLAMA") {
        Ok(ProviderKind::Ollama)
    } else if env_flag("USE_FASTCHAT") {
        Ok(ProviderKind::FastChat)
    } else if env_flag("USE_OPENAI") {
        Ok(ProviderKind::OpenAi)
    } else if env_flag("USE_VLLM") {
        Ok(ProviderKind::Vllm)
    } else if env_flag("USE_TOGETHER") {
        Ok(ProviderKind::Together)
    } else {
        Ok(ProviderKind::Gemini)
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name).map(|v| v == "true").unwrap_or(false)
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        None => Ok(default),
    }
}

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::application::error::QaError;

const DEFAULT_DOCUMENT_PATH: &str = "docs/mce_conveyor_manual_may2015.pdf";
const DEFAULT_INDEX_LOCATION: &str = "index_store_conveyor_manual";

/// Language model and embedding backend settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Which chat model answers questions.
    pub model_name: String,
    /// Generation randomness, 0 to 1.
    pub temperature: f32,
    /// Which embedding model backs the index.
    pub embedding_model: String,
    pub api_key: Option<String>,
    pub api_base: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_factor: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_name: "gpt-3.5-turbo".to_string(),
            temperature: 0.9,
            embedding_model: "text-embedding-ada-002".to_string(),
            api_key: None,
            api_base: "https://api.openai.com/v1".to_string(),
            timeout_secs: 60,
            max_retries: 3,
            backoff_factor: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks of a page.
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 150,
        }
    }
}

impl ChunkerConfig {
    pub fn validate(&self) -> Result<(), QaError> {
        if self.chunk_size == 0 {
            return Err(QaError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(QaError::InvalidConfig(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    pub fn step(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub max_citations: usize,
    pub preview_chars: usize,
    pub embed_batch_size: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            max_citations: 3,
            preview_chars: 150,
            embed_batch_size: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub chunking: ChunkerConfig,
    pub retrieval: RetrievalConfig,
    pub document_path: PathBuf,
    pub index_location: PathBuf,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            chunking: ChunkerConfig::default(),
            retrieval: RetrievalConfig::default(),
            document_path: PathBuf::from(DEFAULT_DOCUMENT_PATH),
            index_location: PathBuf::from(DEFAULT_INDEX_LOCATION),
            port: 3000,
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment (after `.env` has
    /// been loaded), falling back to defaults, and validates it.
    pub fn from_env() -> Result<Self, QaError> {
        let defaults = Self::default();

        let config = Self {
            model: ModelConfig {
                model_name: env_or("QA_MODEL_NAME", defaults.model.model_name),
                temperature: parse_env("QA_TEMPERATURE", defaults.model.temperature)?,
                embedding_model: env_or("QA_EMBEDDING_MODEL", defaults.model.embedding_model),
                api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
                api_base: env_or("OPENAI_API_BASE", defaults.model.api_base),
                timeout_secs: parse_env("QA_HTTP_TIMEOUT_SECS", defaults.model.timeout_secs)?,
                max_retries: parse_env("QA_HTTP_MAX_RETRIES", defaults.model.max_retries)?,
                backoff_factor: parse_env("QA_HTTP_BACKOFF_FACTOR", defaults.model.backoff_factor)?,
            },
            chunking: ChunkerConfig {
                chunk_size: parse_env("QA_CHUNK_SIZE", defaults.chunking.chunk_size)?,
                chunk_overlap: parse_env("QA_CHUNK_OVERLAP", defaults.chunking.chunk_overlap)?,
            },
            retrieval: RetrievalConfig {
                top_k: parse_env("QA_TOP_K", defaults.retrieval.top_k)?,
                max_citations: parse_env("QA_MAX_CITATIONS", defaults.retrieval.max_citations)?,
                preview_chars: parse_env("QA_PREVIEW_CHARS", defaults.retrieval.preview_chars)?,
                embed_batch_size: parse_env(
                    "QA_EMBED_BATCH_SIZE",
                    defaults.retrieval.embed_batch_size,
                )?,
            },
            document_path: env::var("QA_DOCUMENT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.document_path),
            index_location: env::var("QA_INDEX_LOCATION")
                .map(PathBuf::from)
                .unwrap_or(defaults.index_location),
            port: parse_env("PORT", defaults.port)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), QaError> {
        if !(0.0..=1.0).contains(&self.model.temperature) {
            return Err(QaError::InvalidConfig(format!(
                "temperature must be between 0 and 1, got {}",
                self.model.temperature
            )));
        }
        if self.model.model_name.trim().is_empty() {
            return Err(QaError::InvalidConfig("model_name must not be empty".to_string()));
        }
        if self.model.embedding_model.trim().is_empty() {
            return Err(QaError::InvalidConfig(
                "embedding_model must not be empty".to_string(),
            ));
        }
        if self.model.backoff_factor < 1.0 {
            return Err(QaError::InvalidConfig(
                "backoff_factor must be at least 1.0".to_string(),
            ));
        }

        self.chunking.validate()?;

        if self.retrieval.top_k == 0 {
            return Err(QaError::InvalidConfig("top_k must be greater than zero".to_string()));
        }
        if self.retrieval.embed_batch_size == 0 {
            return Err(QaError::InvalidConfig(
                "embed_batch_size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).ok().filter(|v| !v.trim().is_empty()).unwrap_or(default)
}

fn parse_env<T>(key: &str, default: T) -> Result<T, QaError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| QaError::InvalidConfig(format!("{key}={raw:?}: {e}"))),
        _ => Ok(default),
    }
}

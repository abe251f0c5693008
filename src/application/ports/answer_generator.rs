use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::Chunk;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("model returned an empty answer")]
    EmptyAnswer,
}

/// A source the generator claims to have used. Page is one-based, as the
/// model sees it in the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub document_name: String,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAnswer {
    pub answer: String,
    pub self_reported_sources: Vec<SourceRef>,
}

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(
        &self,
        question: &str,
        context: &[Chunk],
    ) -> Result<GeneratedAnswer, GenerationError>;

    fn model_info(&self) -> (String, f32);
}

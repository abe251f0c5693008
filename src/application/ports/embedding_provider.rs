use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError>;

    /// Embeds several texts in one call. Returns exactly one vector per
    /// input, in input order.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// once per text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    fn model_name(&self) -> &str;

    /// Dimension the provider is expected to return, if known up front.
    fn dimensions(&self) -> Option<usize>;
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::application::ports::EmbeddingProvider;
use crate::application::ports::embedding_provider::EmbeddingProviderError;
use crate::infrastructure::external_services::inference_client::{InferenceClient, InferenceError};

const EMBEDDINGS_PATH: &str = "embeddings";

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

impl From<InferenceError> for EmbeddingProviderError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Request(msg) => EmbeddingProviderError::Network(msg),
            InferenceError::RateLimited => EmbeddingProviderError::RateLimitExceeded,
            InferenceError::Status { status, message } => {
                EmbeddingProviderError::Api { status, message }
            }
            InferenceError::Parse(msg) => EmbeddingProviderError::InvalidResponse(msg),
            InferenceError::InvalidUrl(msg) => EmbeddingProviderError::Network(msg),
        }
    }
}

/// Dimension of the known OpenAI embedding models.
fn known_dimensions(model: &str) -> Option<usize> {
    match model {
        "text-embedding-ada-002" | "text-embedding-3-small" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        _ => None,
    }
}

/// [`EmbeddingProvider`] backed by an OpenAI-compatible `/embeddings`
/// endpoint.
pub struct OpenAiEmbeddingProvider {
    client: Arc<InferenceClient>,
    model: String,
}

impl OpenAiEmbeddingProvider {
    pub fn new(client: Arc<InferenceClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            EmbeddingProviderError::InvalidResponse("no embedding returned".to_string())
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(EmbeddingProviderError::InvalidInput(
                "cannot embed empty text".to_string(),
            ));
        }

        debug!(batch_size = texts.len(), model = %self.model, "embedding batch");

        let request = EmbeddingsRequest {
            model: &self.model,
            input: texts,
        };
        let mut response: EmbeddingsResponse =
            self.client.post_json(EMBEDDINGS_PATH, &request).await?;

        if response.data.len() != texts.len() {
            return Err(EmbeddingProviderError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            )));
        }

        response.data.sort_by_key(|d| d.index);
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> Option<usize> {
        known_dimensions(&self.model)
    }
}

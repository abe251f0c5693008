use std::sync::Arc;

use tracing::{debug, info};

use crate::application::error::QaError;
use crate::application::ports::EmbeddingProvider;
use crate::application::ports::embedding_provider::EmbeddingProviderError;
use crate::domain::entities::{Chunk, IndexEntry, VectorIndex};

/// Turns chunks into a searchable [`VectorIndex`] by embedding them in
/// batches. Nothing is stored here; persisting is the caller's job.
pub struct IndexBuilder {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl IndexBuilder {
    pub fn new(embedding_provider: Arc<dyn EmbeddingProvider>, batch_size: usize) -> Self {
        Self {
            embedding_provider,
            batch_size: batch_size.max(1),
        }
    }

    /// Whitespace-only chunks are skipped; they carry nothing to embed.
    pub async fn build(&self, mut chunks: Vec<Chunk>) -> Result<VectorIndex, QaError> {
        let before = chunks.len();
        chunks.retain(|c| !c.text().trim().is_empty());
        if chunks.len() < before {
            debug!(skipped = before - chunks.len(), "skipped blank chunks");
        }

        if chunks.is_empty() {
            return Err(QaError::DocumentParse(
                "document contains no extractable text".to_string(),
            ));
        }

        let mut dimension = self.embedding_provider.dimensions();
        let mut entries = Vec::with_capacity(chunks.len());
        let total_batches = chunks.len().div_ceil(self.batch_size);

        for (batch_number, batch) in chunks.chunks(self.batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.text().to_string()).collect();
            let vectors = self.embedding_provider.embed_batch(&texts).await?;

            if vectors.len() != batch.len() {
                return Err(EmbeddingProviderError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                ))
                .into());
            }

            for (chunk, vector) in batch.iter().zip(vectors) {
                let expected = *dimension.get_or_insert(vector.len());
                if vector.len() != expected {
                    return Err(EmbeddingProviderError::DimensionMismatch {
                        expected,
                        actual: vector.len(),
                    }
                    .into());
                }
                entries.push(IndexEntry {
                    chunk: chunk.clone(),
                    vector,
                });
            }

            debug!(
                batch = batch_number + 1,
                total_batches,
                "embedded chunk batch"
            );
        }

        let dimension = dimension.unwrap_or_default();
        let index = VectorIndex::new(
            self.embedding_provider.model_name().to_string(),
            dimension,
            entries,
        )?;

        info!(
            entries = index.len(),
            dimension,
            model = index.embedding_model(),
            "built vector index"
        );

        Ok(index)
    }
}

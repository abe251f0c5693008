use thiserror::Error;

use crate::application::ports::answer_generator::GenerationError;
use crate::application::ports::document_loader::DocumentLoadError;
use crate::application::ports::embedding_provider::EmbeddingProviderError;
use crate::application::ports::index_store::IndexStoreError;
use crate::domain::entities::VectorIndexError;

#[derive(Debug, Error)]
pub enum QaError {
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("document could not be parsed: {0}")]
    DocumentParse(String),

    #[error("embedding provider error: {0}")]
    EmbeddingProvider(#[from] EmbeddingProviderError),

    #[error("index not found: {0}")]
    IndexNotFound(String),

    #[error("index is corrupt: {0}")]
    IndexCorrupt(String),

    #[error("failed to read index: {0}")]
    IndexRead(String),

    #[error("failed to write index: {0}")]
    IndexWrite(String),

    #[error("answer generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl QaError {
    /// Stable machine-readable code, used by the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            QaError::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            QaError::DocumentParse(_) => "DOCUMENT_PARSE_FAILED",
            QaError::EmbeddingProvider(_) => "EMBEDDING_PROVIDER_FAILED",
            QaError::IndexNotFound(_) => "INDEX_NOT_FOUND",
            QaError::IndexCorrupt(_) => "INDEX_CORRUPT",
            QaError::IndexRead(_) => "INDEX_READ_FAILED",
            QaError::IndexWrite(_) => "INDEX_WRITE_FAILED",
            QaError::Generation(_) => "GENERATION_FAILED",
            QaError::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}

impl From<DocumentLoadError> for QaError {
    fn from(err: DocumentLoadError) -> Self {
        match err {
            DocumentLoadError::NotFound(path) => QaError::DocumentNotFound(path),
            DocumentLoadError::Parse(msg) => QaError::DocumentParse(msg),
        }
    }
}

impl From<IndexStoreError> for QaError {
    fn from(err: IndexStoreError) -> Self {
        match err {
            IndexStoreError::NotFound(location) => {
                QaError::IndexNotFound(location.display().to_string())
            }
            corrupt @ IndexStoreError::Corrupt { .. } => QaError::IndexCorrupt(corrupt.to_string()),
            IndexStoreError::Read(e) => QaError::IndexRead(e.to_string()),
            IndexStoreError::Write(e) => QaError::IndexWrite(e.to_string()),
        }
    }
}

impl From<VectorIndexError> for QaError {
    fn from(err: VectorIndexError) -> Self {
        match err {
            VectorIndexError::DimensionMismatch { expected, actual } => {
                QaError::EmbeddingProvider(EmbeddingProviderError::DimensionMismatch {
                    expected,
                    actual,
                })
            }
            VectorIndexError::ZeroDimension => QaError::EmbeddingProvider(
                EmbeddingProviderError::InvalidResponse(err.to_string()),
            ),
        }
    }
}

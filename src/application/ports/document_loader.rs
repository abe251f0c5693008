use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::domain::entities::LoadedDocument;

#[derive(Debug, Error)]
pub enum DocumentLoadError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("failed to parse document: {0}")]
    Parse(String),
}

#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Reads the document at `path` into pages, in reading order, numbered
    /// from zero.
    async fn load(&self, path: &Path) -> Result<LoadedDocument, DocumentLoadError>;
}

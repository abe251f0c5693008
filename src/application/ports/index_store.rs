use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::entities::VectorIndex;

#[derive(Debug, Error)]
pub enum IndexStoreError {
    #[error("no index found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("index at {} is corrupt: {reason}", .location.display())]
    Corrupt { location: PathBuf, reason: String },

    #[error("failed to read index: {0}")]
    Read(std::io::Error),

    #[error("failed to write index: {0}")]
    Write(std::io::Error),
}

/// Durable storage for a single vector index per location.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Replaces whatever index is stored at `location`. Either the new index
    /// becomes readable in full or the previous state is left untouched.
    async fn save(&self, index: &VectorIndex, location: &Path) -> Result<(), IndexStoreError>;

    async fn load(&self, location: &Path) -> Result<VectorIndex, IndexStoreError>;

    async fn exists(&self, location: &Path) -> bool;
}

//! In-process fakes for the ports, shared by the application tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::application::ports::answer_generator::{GeneratedAnswer, GenerationError, SourceRef};
use crate::application::ports::document_loader::DocumentLoadError;
use crate::application::ports::embedding_provider::EmbeddingProviderError;
use crate::application::ports::index_store::IndexStoreError;
use crate::application::ports::{AnswerGenerator, DocumentLoader, EmbeddingProvider, IndexStore};
use crate::domain::entities::{Chunk, LoadedDocument, Page, VectorIndex};
use crate::domain::value_objects::PageNumber;

const KEYWORDS: [&str; 8] = [
    "belt",
    "motor",
    "sensor",
    "safety",
    "speed",
    "alarm",
    "roller",
    "maintenance",
];

/// Deterministic bag-of-keywords embeddings. The last component is a
/// constant so no vector has zero magnitude.
#[derive(Default)]
pub struct KeywordEmbeddings {
    batch_calls: AtomicUsize,
}

impl KeywordEmbeddings {
    pub const DIMENSION: usize = KEYWORDS.len() + 1;

    pub fn vector_for(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> = KEYWORDS
            .iter()
            .map(|k| lower.matches(*k).count() as f32)
            .collect();
        vector.push(0.1);
        vector
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError> {
        Ok(Self::vector_for(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }

    fn dimensions(&self) -> Option<usize> {
        Some(Self::DIMENSION)
    }
}

pub struct FailingEmbeddings;

#[async_trait]
impl EmbeddingProvider for FailingEmbeddings {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingProviderError> {
        Err(EmbeddingProviderError::Network(
            "connection refused".to_string(),
        ))
    }

    fn model_name(&self) -> &str {
        "failing"
    }

    fn dimensions(&self) -> Option<usize> {
        None
    }
}

/// Answers with a fixed sentence and reports the first context chunk as
/// its source.
pub struct CannedGenerator {
    pub answer: String,
}

impl Default for CannedGenerator {
    fn default() -> Self {
        Self {
            answer: "Check the belt tension weekly.".to_string(),
        }
    }
}

#[async_trait]
impl AnswerGenerator for CannedGenerator {
    async fn generate(
        &self,
        _question: &str,
        context: &[Chunk],
    ) -> Result<GeneratedAnswer, GenerationError> {
        Ok(GeneratedAnswer {
            answer: self.answer.clone(),
            self_reported_sources: context
                .first()
                .map(|c| SourceRef {
                    document_name: c.document_name().to_string(),
                    page: Some(c.page().display()),
                })
                .into_iter()
                .collect(),
        })
    }

    fn model_info(&self) -> (String, f32) {
        ("canned".to_string(), 0.0)
    }
}

pub struct FailingGenerator;

#[async_trait]
impl AnswerGenerator for FailingGenerator {
    async fn generate(
        &self,
        _question: &str,
        _context: &[Chunk],
    ) -> Result<GeneratedAnswer, GenerationError> {
        Err(GenerationError::Api {
            status: 503,
            message: "model overloaded".to_string(),
        })
    }

    fn model_info(&self) -> (String, f32) {
        ("failing".to_string(), 0.0)
    }
}

/// Serves a fixed document regardless of the requested path, unless the
/// path is in `missing`.
pub struct StaticLoader {
    pub name: String,
    pub pages: Vec<String>,
    pub missing: Vec<PathBuf>,
}

impl StaticLoader {
    pub fn new(name: &str, pages: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            pages: pages.iter().map(|p| p.to_string()).collect(),
            missing: Vec::new(),
        }
    }
}

#[async_trait]
impl DocumentLoader for StaticLoader {
    async fn load(&self, path: &Path) -> Result<LoadedDocument, DocumentLoadError> {
        if self.missing.iter().any(|m| m == path) {
            return Err(DocumentLoadError::NotFound(path.display().to_string()));
        }
        let pages = self
            .pages
            .iter()
            .enumerate()
            .map(|(i, text)| Page::new(self.name.clone(), PageNumber::new(i as u32), text.clone()))
            .collect();
        Ok(LoadedDocument {
            name: self.name.clone(),
            pages,
        })
    }
}

#[derive(Default)]
pub struct InMemoryIndexStore {
    indexes: Mutex<HashMap<PathBuf, VectorIndex>>,
}

impl InMemoryIndexStore {
    pub fn stored(&self, location: &Path) -> Option<VectorIndex> {
        self.indexes
            .lock()
            .ok()
            .and_then(|m| m.get(location).cloned())
    }
}

#[async_trait]
impl IndexStore for InMemoryIndexStore {
    async fn save(&self, index: &VectorIndex, location: &Path) -> Result<(), IndexStoreError> {
        self.indexes
            .lock()
            .map_err(|_| IndexStoreError::Write(std::io::Error::other("poisoned")))?
            .insert(location.to_path_buf(), index.clone());
        Ok(())
    }

    async fn load(&self, location: &Path) -> Result<VectorIndex, IndexStoreError> {
        self.stored(location)
            .ok_or_else(|| IndexStoreError::NotFound(location.to_path_buf()))
    }

    async fn exists(&self, location: &Path) -> bool {
        self.stored(location).is_some()
    }
}

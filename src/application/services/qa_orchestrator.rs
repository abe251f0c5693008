use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::application::error::QaError;
use crate::application::ports::answer_generator::SourceRef;
use crate::application::ports::{AnswerGenerator, DocumentLoader, EmbeddingProvider, IndexStore};
use crate::application::services::chunker::TextChunker;
use crate::application::services::index_builder::IndexBuilder;
use crate::config::{ChunkerConfig, RetrievalConfig};
use crate::domain::entities::{ChatTurn, Citation, ScoredChunk, Session, derive_citations};
use crate::domain::value_objects::BuildStatus;

pub const PROCESS_DOCUMENT_FIRST: &str =
    "Please process the document first before asking questions.";

/// Where a question/answer cycle currently is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStage {
    Idle,
    Validating,
    Retrieving,
    Generating,
    Formatting,
    Appended,
    Failed,
}

/// The assistant turn appended by [`QaOrchestrator::answer`].
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub turn: ChatTurn,
    pub stage: AnswerStage,
    /// Stage that failed, when `stage` is [`AnswerStage::Failed`].
    pub failed_at: Option<AnswerStage>,
}

impl AnswerOutcome {
    pub fn is_failed(&self) -> bool {
        self.stage == AnswerStage::Failed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub pages: usize,
    pub chunks: usize,
}

pub struct QaOrchestrator {
    document_loader: Arc<dyn DocumentLoader>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    answer_generator: Arc<dyn AnswerGenerator>,
    index_store: Arc<dyn IndexStore>,
    chunker: TextChunker,
    index_builder: IndexBuilder,
    retrieval: RetrievalConfig,
    index_location: PathBuf,
}

impl QaOrchestrator {
    pub fn new(
        document_loader: Arc<dyn DocumentLoader>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        answer_generator: Arc<dyn AnswerGenerator>,
        index_store: Arc<dyn IndexStore>,
        chunking: ChunkerConfig,
        retrieval: RetrievalConfig,
        index_location: PathBuf,
    ) -> Result<Self, QaError> {
        let chunker = TextChunker::new(chunking)?;
        let index_builder =
            IndexBuilder::new(embedding_provider.clone(), retrieval.embed_batch_size);

        Ok(Self {
            document_loader,
            embedding_provider,
            answer_generator,
            index_store,
            chunker,
            index_builder,
            retrieval,
            index_location,
        })
    }

    pub fn index_location(&self) -> &Path {
        &self.index_location
    }

    pub async fn index_exists(&self) -> bool {
        self.index_store.exists(&self.index_location).await
    }

    /// Loads, chunks, embeds and saves the document at `document_path`,
    /// reporting each stage on `progress`. The last event sent is always
    /// `Completed` or `Failed`. On failure the stored index is untouched.
    pub async fn build_index(
        &self,
        document_path: &Path,
        progress: &mpsc::UnboundedSender<BuildStatus>,
    ) -> Result<BuildSummary, QaError> {
        match self.run_build(document_path, progress).await {
            Ok(summary) => {
                info!(
                    document = %document_path.display(),
                    pages = summary.pages,
                    chunks = summary.chunks,
                    "index build completed"
                );
                let _ = progress.send(BuildStatus::Completed {
                    pages: summary.pages,
                    chunks: summary.chunks,
                });
                Ok(summary)
            }
            Err(e) => {
                error!(document = %document_path.display(), error = %e, "index build failed");
                let _ = progress.send(BuildStatus::Failed {
                    code: e.code().to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_build(
        &self,
        document_path: &Path,
        progress: &mpsc::UnboundedSender<BuildStatus>,
    ) -> Result<BuildSummary, QaError> {
        let _ = progress.send(BuildStatus::Loading {
            document: document_path.display().to_string(),
        });
        let document = self.document_loader.load(document_path).await?;

        let pages = document.page_count();
        let _ = progress.send(BuildStatus::Chunking { pages });
        let chunks = self.chunker.chunk_pages(&document.pages);
        if chunks.is_empty() {
            return Err(QaError::DocumentParse(format!(
                "{} has no extractable text",
                document.name
            )));
        }

        let _ = progress.send(BuildStatus::Embedding {
            chunks: chunks.len(),
        });
        let index = self.index_builder.build(chunks).await?;

        let _ = progress.send(BuildStatus::Saving {
            location: self.index_location.display().to_string(),
        });
        self.index_store.save(&index, &self.index_location).await?;

        Ok(BuildSummary {
            pages,
            chunks: index.len(),
        })
    }

    /// Runs one question/answer cycle against `session`.
    ///
    /// Always appends exactly one assistant turn and returns it; failures
    /// become a failed turn carrying the error message.
    pub async fn answer(&self, question: &str, session: &mut Session) -> AnswerOutcome {
        let mut stage = AnswerStage::Validating;

        if !self.index_store.exists(&self.index_location).await {
            warn!(
                location = %self.index_location.display(),
                "question asked before an index was built"
            );
            return Self::fail(session, PROCESS_DOCUMENT_FIRST.to_string(), stage);
        }

        session.append(ChatTurn::user(question));

        match self.respond(question, &mut stage).await {
            Ok(turn) => {
                session.append(turn.clone());
                AnswerOutcome {
                    turn,
                    stage: AnswerStage::Appended,
                    failed_at: None,
                }
            }
            Err(e) => {
                error!(stage = ?stage, error = %e, "failed to answer question");
                Self::fail(
                    session,
                    format!("Error processing your question: {e}"),
                    stage,
                )
            }
        }
    }

    async fn respond(&self, question: &str, stage: &mut AnswerStage) -> Result<ChatTurn, QaError> {
        *stage = AnswerStage::Retrieving;
        let retrieved = self.retrieve(question).await?;

        *stage = AnswerStage::Generating;
        let context: Vec<_> = retrieved.iter().map(|hit| hit.chunk.clone()).collect();
        let generated = self.answer_generator.generate(question, &context).await?;

        *stage = AnswerStage::Formatting;
        let citations = derive_citations(
            &context,
            self.retrieval.max_citations,
            self.retrieval.preview_chars,
        );
        log_source_disagreement(&citations, &generated.self_reported_sources);

        Ok(ChatTurn::assistant(generated.answer, citations))
    }

    async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>, QaError> {
        let index = self.index_store.load(&self.index_location).await?;

        if index.embedding_model() != self.embedding_provider.model_name() {
            warn!(
                index_model = index.embedding_model(),
                provider_model = self.embedding_provider.model_name(),
                "index was built with a different embedding model"
            );
        }

        let query = self.embedding_provider.embed(question).await?;
        let hits = index.retrieve(&query, self.retrieval.top_k)?;

        debug!(
            hits = hits.len(),
            top_score = hits.first().map(|h| h.score),
            "retrieved context"
        );

        Ok(hits)
    }

    fn fail(session: &mut Session, message: String, failed_at: AnswerStage) -> AnswerOutcome {
        let turn = ChatTurn::failure(message);
        session.append(turn.clone());
        AnswerOutcome {
            turn,
            stage: AnswerStage::Failed,
            failed_at: Some(failed_at),
        }
    }
}

fn log_source_disagreement(citations: &[Citation], reported: &[SourceRef]) {
    let unmatched: Vec<String> = reported
        .iter()
        .filter(|source| {
            !citations.iter().any(|c| {
                c.document_name == source.document_name
                    && source.page.is_none_or(|p| p == c.page.display())
            })
        })
        .map(|source| match source.page {
            Some(page) => format!("{} page {}", source.document_name, page),
            None => source.document_name.clone(),
        })
        .collect();

    if !unmatched.is_empty() {
        debug!(
            unmatched = ?unmatched,
            citations = citations.len(),
            "generator reported sources that are not among the citations"
        );
    }
}

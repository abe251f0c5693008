use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::stream::{self, Stream};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::application::services::QaOrchestrator;
use crate::domain::value_objects::BuildStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildIndexError {
    #[error("an index build is already running")]
    BuildAlreadyRunning,
}

/// Starts index builds in the background, one at a time.
pub struct BuildIndexUseCase {
    orchestrator: Arc<QaOrchestrator>,
    default_document: PathBuf,
    running: Arc<AtomicBool>,
}

/// Clears the running flag when the build task ends, even on panic.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl BuildIndexUseCase {
    pub fn new(orchestrator: Arc<QaOrchestrator>, default_document: PathBuf) -> Self {
        Self {
            orchestrator,
            default_document,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawns a build of `document_path` (or the configured manual) and
    /// returns its progress. The stream ends after the `Completed` or
    /// `Failed` event.
    pub fn start(
        &self,
        document_path: Option<PathBuf>,
    ) -> Result<impl Stream<Item = BuildStatus> + Send + 'static, BuildIndexError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("rejected index build: another build is running");
            return Err(BuildIndexError::BuildAlreadyRunning);
        }

        let guard = RunningGuard(self.running.clone());
        let document = document_path.unwrap_or_else(|| self.default_document.clone());
        let orchestrator = self.orchestrator.clone();
        let (tx, rx) = mpsc::unbounded_channel();

        info!(document = %document.display(), "starting index build");

        tokio::spawn(async move {
            let _guard = guard;
            // Outcome is reported through `tx`.
            let _ = orchestrator.build_index(&document, &tx).await;
        });

        Ok(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|status| (status, rx))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{
        CannedGenerator, FailingEmbeddings, InMemoryIndexStore, KeywordEmbeddings, StaticLoader,
    };
    use crate::application::ports::EmbeddingProvider;
    use crate::config::{ChunkerConfig, RetrievalConfig};
    use futures::StreamExt;

    fn use_case(embeddings: Arc<dyn EmbeddingProvider>) -> BuildIndexUseCase {
        let orchestrator = QaOrchestrator::new(
            Arc::new(StaticLoader::new(
                "manual.pdf",
                &["Motor wiring diagram.", "Belt alignment steps."],
            )),
            embeddings,
            Arc::new(CannedGenerator::default()),
            Arc::new(InMemoryIndexStore::default()),
            ChunkerConfig::default(),
            RetrievalConfig::default(),
            PathBuf::from("index"),
        )
        .unwrap();
        BuildIndexUseCase::new(Arc::new(orchestrator), PathBuf::from("manual.pdf"))
    }

    #[tokio::test]
    async fn test_stream_ends_with_completed() {
        let use_case = use_case(Arc::new(KeywordEmbeddings::default()));

        let events: Vec<BuildStatus> = use_case.start(None).unwrap().collect().await;

        assert_eq!(events.len(), 5);
        assert_eq!(
            events.last(),
            Some(&BuildStatus::Completed {
                pages: 2,
                chunks: 2
            })
        );
    }

    #[tokio::test]
    async fn test_stream_ends_with_failed() {
        let use_case = use_case(Arc::new(FailingEmbeddings));

        let events: Vec<BuildStatus> = use_case.start(None).unwrap().collect().await;

        assert!(events.last().is_some_and(BuildStatus::is_failed));
    }

    #[tokio::test]
    async fn test_second_build_is_rejected_while_running() {
        let use_case = use_case(Arc::new(KeywordEmbeddings::default()));

        let first = use_case.start(None).unwrap();
        assert!(use_case.is_running());
        assert!(matches!(
            use_case.start(None),
            Err(BuildIndexError::BuildAlreadyRunning)
        ));

        let _: Vec<_> = first.collect().await;
        tokio::task::yield_now().await;
        // The flag is cleared once the task has dropped its guard.
        for _ in 0..10 {
            if !use_case.is_running() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(!use_case.is_running());
        assert!(use_case.start(None).is_ok());
    }
}

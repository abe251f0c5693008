pub mod chunker;
pub mod index_builder;
pub mod qa_orchestrator;

pub use chunker::TextChunker;
pub use index_builder::IndexBuilder;
pub use qa_orchestrator::{AnswerOutcome, AnswerStage, BuildSummary, QaOrchestrator};

pub mod container;
pub mod external_services;
pub mod file_system;

// Re-export commonly used items
pub use container::AppContainer;
pub use external_services::{ChatAnswerGenerator, OpenAiEmbeddingProvider, PdfDocumentLoader};
pub use file_system::LocalIndexStore;

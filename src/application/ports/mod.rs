pub mod answer_generator;
pub mod document_loader;
pub mod embedding_provider;
pub mod index_store;

pub use answer_generator::AnswerGenerator;
pub use document_loader::DocumentLoader;
pub use embedding_provider::EmbeddingProvider;
pub use index_store::IndexStore;

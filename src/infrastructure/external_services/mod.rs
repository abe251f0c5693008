pub mod chat_answer_generator;
pub mod inference_client;
pub mod openai_embeddings;
pub mod pdf_loader;

pub use chat_answer_generator::ChatAnswerGenerator;
pub use inference_client::{InferenceClient, InferenceClientConfig};
pub use openai_embeddings::OpenAiEmbeddingProvider;
pub use pdf_loader::PdfDocumentLoader;

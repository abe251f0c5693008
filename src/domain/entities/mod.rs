pub mod chat_turn;
pub mod chunk;
pub mod citation;
pub mod page;
pub mod session;
pub mod vector_index;

pub use chat_turn::{ChatTurn, Role};
pub use chunk::Chunk;
pub use citation::{Citation, derive_citations};
pub use page::{LoadedDocument, Page};
pub use session::Session;
pub use vector_index::{IndexEntry, ScoredChunk, VectorIndex, VectorIndexError};

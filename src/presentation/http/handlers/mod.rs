pub mod chat_handler;
pub mod index_handler;
pub mod sse_handler;

pub use chat_handler::ChatHandler;
pub use index_handler::IndexHandler;

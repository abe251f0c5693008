pub mod chat_dto;
pub mod index_dto;
pub mod response_dto;

pub use chat_dto::*;
pub use index_dto::*;
pub use response_dto::*;

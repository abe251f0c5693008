pub mod ask_question;
pub mod build_index;
pub mod clear_history;

pub use ask_question::{AskQuestionError, AskQuestionRequest, AskQuestionResponse, AskQuestionUseCase};
pub use build_index::{BuildIndexError, BuildIndexUseCase};
pub use clear_history::ClearHistoryUseCase;

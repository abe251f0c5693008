use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::services::{AnswerOutcome, QaOrchestrator};
use crate::domain::entities::Session;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AskQuestionError {
    #[error("invalid question: {0}")]
    InvalidQuestion(String),
}

#[derive(Debug, Clone)]
pub struct AskQuestionRequest {
    pub question: String,
}

#[derive(Debug, Clone)]
pub struct AskQuestionResponse {
    pub outcome: AnswerOutcome,
    pub answer_time_ms: u64,
}

pub struct AskQuestionUseCase {
    orchestrator: Arc<QaOrchestrator>,
}

impl AskQuestionUseCase {
    pub fn new(orchestrator: Arc<QaOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn execute(
        &self,
        request: AskQuestionRequest,
        session: &mut Session,
    ) -> Result<AskQuestionResponse, AskQuestionError> {
        let start_time = std::time::Instant::now();

        let question = request.question.trim();
        if question.is_empty() {
            return Err(AskQuestionError::InvalidQuestion(
                "Question cannot be empty".to_string(),
            ));
        }

        let outcome = self.orchestrator.answer(question, session).await;
        let answer_time_ms = start_time.elapsed().as_millis() as u64;

        info!(
            session_id = %session.id(),
            stage = ?outcome.stage,
            citations = outcome.turn.citations().len(),
            answer_time_ms,
            "answered question"
        );

        Ok(AskQuestionResponse {
            outcome,
            answer_time_ms,
        })
    }
}

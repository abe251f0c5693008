use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::AnswerStage;
use crate::application::use_cases::AskQuestionResponse;
use crate::domain::entities::{ChatTurn, Citation, Role, Session};

#[derive(Debug, Deserialize)]
pub struct AskQuestionRequestDto {
    pub question: String,
}

/// A citation as shown to users: pages are one-based.
#[derive(Debug, Serialize)]
pub struct CitationDto {
    pub document_name: String,
    pub page: u32,
    pub preview: String,
}

impl From<&Citation> for CitationDto {
    fn from(citation: &Citation) -> Self {
        Self {
            document_name: citation.document_name.clone(),
            page: citation.page.display(),
            preview: citation.preview.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatTurnDto {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub citations: Vec<CitationDto>,
    pub failed: bool,
    pub created_at: String,
}

impl From<&ChatTurn> for ChatTurnDto {
    fn from(turn: &ChatTurn) -> Self {
        Self {
            id: turn.id(),
            role: turn.role(),
            content: turn.content().to_string(),
            citations: turn.citations().iter().map(CitationDto::from).collect(),
            failed: turn.is_failure(),
            created_at: turn.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnswerResponseDto {
    pub turn: ChatTurnDto,
    pub stage: AnswerStage,
    pub answer_time_ms: u64,
}

impl From<AskQuestionResponse> for AnswerResponseDto {
    fn from(response: AskQuestionResponse) -> Self {
        Self {
            turn: ChatTurnDto::from(&response.outcome.turn),
            stage: response.outcome.stage,
            answer_time_ms: response.answer_time_ms,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatHistoryDto {
    pub session_id: Uuid,
    pub started_at: String,
    pub turns: Vec<ChatTurnDto>,
    pub total_turns: usize,
}

impl From<&Session> for ChatHistoryDto {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id(),
            started_at: session.started_at().to_rfc3339(),
            turns: session.turns().iter().map(ChatTurnDto::from).collect(),
            total_turns: session.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClearHistoryResponseDto {
    pub removed_turns: usize,
}

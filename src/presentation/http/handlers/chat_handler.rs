use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::use_cases::{
    AskQuestionError, AskQuestionRequest, AskQuestionUseCase, ClearHistoryUseCase,
};
use crate::domain::entities::Session;
use crate::presentation::http::dto::{
    AnswerResponseDto, ApiResponse, AskQuestionRequestDto, ChatHistoryDto,
    ClearHistoryResponseDto,
};

/// Serves the single conversation. Holding the session lock for a whole
/// question keeps answers in order.
pub struct ChatHandler {
    ask_question_use_case: Arc<AskQuestionUseCase>,
    clear_history_use_case: Arc<ClearHistoryUseCase>,
    session: Mutex<Session>,
}

impl ChatHandler {
    pub fn new(
        ask_question_use_case: Arc<AskQuestionUseCase>,
        clear_history_use_case: Arc<ClearHistoryUseCase>,
    ) -> Self {
        Self {
            ask_question_use_case,
            clear_history_use_case,
            session: Mutex::new(Session::new()),
        }
    }

    pub async fn ask_question(
        State(handler): State<Arc<ChatHandler>>,
        Json(request): Json<AskQuestionRequestDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let mut session = handler.session.lock().await;
        let request = AskQuestionRequest {
            question: request.question,
        };

        match handler
            .ask_question_use_case
            .execute(request, &mut session)
            .await
        {
            Ok(response) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(AnswerResponseDto::from(response))),
            )),
            Err(e @ AskQuestionError::InvalidQuestion(_)) => Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    "INVALID_QUESTION".to_string(),
                    e.to_string(),
                    None,
                )),
            )),
        }
    }

    pub async fn history(
        State(handler): State<Arc<ChatHandler>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let session = handler.session.lock().await;
        let dto = ChatHistoryDto::from(&*session);

        Ok((StatusCode::OK, Json(ApiResponse::success(dto))))
    }

    pub async fn clear_history(
        State(handler): State<Arc<ChatHandler>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let mut session = handler.session.lock().await;
        let removed_turns = handler.clear_history_use_case.execute(&mut session);

        Ok((
            StatusCode::OK,
            Json(ApiResponse::success(ClearHistoryResponseDto { removed_turns })),
        ))
    }
}

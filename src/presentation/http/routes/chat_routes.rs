use axum::{Router, routing::get};
use std::sync::Arc;

use crate::presentation::http::handlers::ChatHandler;

pub fn chat_routes(chat_handler: Arc<ChatHandler>) -> Router {
    Router::new()
        .route(
            "/chat",
            get(ChatHandler::history)
                .post(ChatHandler::ask_question)
                .delete(ChatHandler::clear_history),
        )
        .with_state(chat_handler)
}

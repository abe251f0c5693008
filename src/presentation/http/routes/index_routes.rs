use axum::{Router, routing::get};
use std::sync::Arc;

use crate::presentation::http::handlers::IndexHandler;

pub fn index_routes(index_handler: Arc<IndexHandler>) -> Router {
    Router::new()
        .route(
            "/index",
            get(IndexHandler::index_status).post(IndexHandler::build_index),
        )
        .with_state(index_handler)
}

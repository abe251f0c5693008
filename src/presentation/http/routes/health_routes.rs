use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use std::sync::Arc;

use crate::application::services::QaOrchestrator;
use crate::presentation::http::dto::{ApiResponse, HealthResponseDto};

pub fn health_routes(orchestrator: Arc<QaOrchestrator>) -> Router {
    Router::new()
        .route("/", get(service_name))
        .route("/health", get(health))
        .with_state(orchestrator)
}

async fn service_name() -> impl IntoResponse {
    Json(ApiResponse::success(env!("CARGO_PKG_NAME").to_string()))
}

// The process is healthy either way; `index_ready` tells clients whether
// questions can be answered yet.
async fn health(State(orchestrator): State<Arc<QaOrchestrator>>) -> impl IntoResponse {
    let index_ready = orchestrator.index_exists().await;
    let dto = HealthResponseDto {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        index_ready,
    };

    (StatusCode::OK, Json(ApiResponse::success(dto)))
}

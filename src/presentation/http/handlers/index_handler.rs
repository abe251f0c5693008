use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response, sse::Event},
};
use futures::StreamExt;
use std::{convert::Infallible, path::PathBuf, sync::Arc};

use crate::application::services::QaOrchestrator;
use crate::application::use_cases::{BuildIndexError, BuildIndexUseCase};
use crate::presentation::http::dto::{
    ApiResponse, BuildIndexRequestDto, BuildStatusDto, IndexStatusDto,
};
use crate::presentation::http::handlers::sse_handler::create_sse_response;

pub struct IndexHandler {
    build_index_use_case: Arc<BuildIndexUseCase>,
    orchestrator: Arc<QaOrchestrator>,
}

impl IndexHandler {
    pub fn new(
        build_index_use_case: Arc<BuildIndexUseCase>,
        orchestrator: Arc<QaOrchestrator>,
    ) -> Self {
        Self {
            build_index_use_case,
            orchestrator,
        }
    }

    pub fn orchestrator(&self) -> Arc<QaOrchestrator> {
        self.orchestrator.clone()
    }

    // Start a build and stream its progress
    pub async fn build_index(
        State(handler): State<Arc<IndexHandler>>,
        request: Option<Json<BuildIndexRequestDto>>,
    ) -> Response {
        let document_path = request
            .and_then(|Json(dto)| dto.document_path)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        match handler.build_index_use_case.start(document_path) {
            Ok(progress) => {
                let events = progress.map(|status| {
                    let data = serde_json::to_string(&BuildStatusDto::from(status))
                        .unwrap_or_default();
                    Ok::<_, Infallible>(Event::default().event("build_status").data(data))
                });
                create_sse_response(events)
            }
            Err(e @ BuildIndexError::BuildAlreadyRunning) => (
                StatusCode::CONFLICT,
                Json(ApiResponse::<()>::error(
                    "BUILD_ALREADY_RUNNING".to_string(),
                    e.to_string(),
                    None,
                )),
            )
                .into_response(),
        }
    }

    pub async fn index_status(
        State(handler): State<Arc<IndexHandler>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let dto = IndexStatusDto {
            exists: handler.orchestrator.index_exists().await,
            location: handler.orchestrator.index_location().display().to_string(),
            build_running: handler.build_index_use_case.is_running(),
        };

        Ok((StatusCode::OK, Json(ApiResponse::success(dto))))
    }
}

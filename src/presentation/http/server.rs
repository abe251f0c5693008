use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::presentation::http::{
    handlers::{ChatHandler, IndexHandler},
    routes::{chat_routes, health_routes, index_routes},
};

/// Requests carry at most a question or a document path.
const BODY_LIMIT_BYTES: usize = 64 * 1024;

pub struct HttpServer {
    index_handler: Arc<IndexHandler>,
    chat_handler: Arc<ChatHandler>,
    port: u16,
}

impl HttpServer {
    pub fn new(
        index_handler: Arc<IndexHandler>,
        chat_handler: Arc<ChatHandler>,
        port: Option<u16>,
    ) -> Self {
        Self {
            index_handler,
            chat_handler,
            port: port.unwrap_or(3000),
        }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let trace = TraceLayer::new_for_http()
            .on_request(
                |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                    tracing::info!(
                        method = %request.method(),
                        uri = %request.uri(),
                        "received request"
                    );
                },
            )
            .on_response(
                |response: &axum::http::Response<axum::body::Body>,
                 latency: std::time::Duration,
                 _span: &tracing::Span| {
                    tracing::info!(
                        status = %response.status(),
                        latency_ms = latency.as_millis() as u64,
                        "sent response"
                    );
                },
            )
            .on_failure(
                |error: ServerErrorsFailureClass,
                 latency: std::time::Duration,
                 _span: &tracing::Span| {
                    tracing::error!(
                        error = ?error,
                        latency_ms = latency.as_millis() as u64,
                        "request failed"
                    );
                },
            );

        Router::new()
            .merge(health_routes(self.index_handler.orchestrator()))
            .merge(index_routes(self.index_handler.clone()))
            .merge(chat_routes(self.chat_handler.clone()))
            .layer(cors)
            .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
            .layer(trace)
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "HTTP server listening");
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::QaOrchestrator;
    use crate::application::test_support::{
        CannedGenerator, InMemoryIndexStore, KeywordEmbeddings, StaticLoader,
    };
    use crate::application::use_cases::{
        AskQuestionUseCase, BuildIndexUseCase, ClearHistoryUseCase,
    };
    use crate::config::{ChunkerConfig, RetrievalConfig};
    use serde_json::{Value, json};
    use std::path::PathBuf;

    async fn start() -> String {
        let orchestrator = Arc::new(
            QaOrchestrator::new(
                Arc::new(StaticLoader::new(
                    "manual.pdf",
                    &[
                        "Lock out the motor before maintenance.",
                        "Check the belt tension weekly.",
                    ],
                )),
                Arc::new(KeywordEmbeddings::default()),
                Arc::new(CannedGenerator::default()),
                Arc::new(InMemoryIndexStore::default()),
                ChunkerConfig::default(),
                RetrievalConfig::default(),
                PathBuf::from("index"),
            )
            .unwrap(),
        );
        let index_handler = Arc::new(IndexHandler::new(
            Arc::new(BuildIndexUseCase::new(
                orchestrator.clone(),
                PathBuf::from("manual.pdf"),
            )),
            orchestrator.clone(),
        ));
        let chat_handler = Arc::new(ChatHandler::new(
            Arc::new(AskQuestionUseCase::new(orchestrator)),
            Arc::new(ClearHistoryUseCase::new()),
        ));
        let router = HttpServer::new(index_handler, chat_handler, None).router();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn ask(client: &reqwest::Client, base: &str, question: &str) -> (u16, Value) {
        let response = client
            .post(format!("{base}/chat"))
            .json(&json!({ "question": question }))
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let base = start().await;
        let body: Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["service"], "manualqa");
        assert_eq!(body["data"]["index_ready"], false);
    }

    #[tokio::test]
    async fn test_empty_question_is_bad_request() {
        let base = start().await;
        let client = reqwest::Client::new();

        let (status, body) = ask(&client, &base, "   ").await;

        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], "INVALID_QUESTION");
    }

    #[tokio::test]
    async fn test_question_before_build_is_failed_turn() {
        let base = start().await;
        let client = reqwest::Client::new();

        let (status, body) = ask(&client, &base, "belt?").await;

        assert_eq!(status, 200);
        assert_eq!(body["data"]["turn"]["failed"], true);
        assert_eq!(
            body["data"]["turn"]["content"],
            "Please process the document first before asking questions."
        );
    }

    #[tokio::test]
    async fn test_build_then_ask_then_clear() {
        let base = start().await;
        let client = reqwest::Client::new();

        let events = client
            .post(format!("{base}/index"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(events.contains("event: build_status"));
        assert!(events.contains("\"stage\":\"completed\""));

        let status: Value = client
            .get(format!("{base}/index"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["data"]["exists"], true);

        let health: Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["data"]["index_ready"], true);

        let (code, body) = ask(&client, &base, "belt tension").await;
        assert_eq!(code, 200);
        assert_eq!(body["data"]["turn"]["failed"], false);
        assert_eq!(body["data"]["turn"]["citations"][0]["page"], 2);

        let history: Value = client
            .get(format!("{base}/chat"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(history["data"]["total_turns"], 2);
        assert_eq!(history["data"]["turns"][0]["role"], "user");

        let cleared: Value = client
            .delete(format!("{base}/chat"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(cleared["data"]["removed_turns"], 2);
    }
}

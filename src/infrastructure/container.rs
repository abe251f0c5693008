use std::sync::Arc;

use crate::{
    application::{
        error::QaError,
        ports::{AnswerGenerator, DocumentLoader, EmbeddingProvider, IndexStore},
        services::QaOrchestrator,
        use_cases::{AskQuestionUseCase, BuildIndexUseCase, ClearHistoryUseCase},
    },
    config::AppConfig,
    infrastructure::{
        external_services::{
            ChatAnswerGenerator, InferenceClient, InferenceClientConfig, OpenAiEmbeddingProvider,
            PdfDocumentLoader,
        },
        file_system::LocalIndexStore,
    },
    presentation::http::{
        HttpServer,
        handlers::{ChatHandler, IndexHandler},
    },
};

pub struct AppContainer {
    pub config: AppConfig,

    // External Services
    pub document_loader: Arc<dyn DocumentLoader>,
    pub embedding_provider: Arc<dyn EmbeddingProvider>,
    pub answer_generator: Arc<dyn AnswerGenerator>,
    pub index_store: Arc<dyn IndexStore>,

    // Application Services
    pub orchestrator: Arc<QaOrchestrator>,

    // Use Cases
    pub build_index_use_case: Arc<BuildIndexUseCase>,
    pub ask_question_use_case: Arc<AskQuestionUseCase>,
    pub clear_history_use_case: Arc<ClearHistoryUseCase>,

    // HTTP Handlers
    pub index_handler: Arc<IndexHandler>,
    pub chat_handler: Arc<ChatHandler>,
}

impl AppContainer {
    pub fn new(config: AppConfig) -> Result<Self, QaError> {
        config.validate()?;

        // Create external services
        let inference_client = Arc::new(
            InferenceClient::new(InferenceClientConfig::from(&config.model))
                .map_err(|e| QaError::InvalidConfig(e.to_string()))?,
        );

        let document_loader: Arc<dyn DocumentLoader> = Arc::new(PdfDocumentLoader::new());
        let embedding_provider: Arc<dyn EmbeddingProvider> = Arc::new(
            OpenAiEmbeddingProvider::new(inference_client.clone(), &config.model.embedding_model),
        );
        let answer_generator: Arc<dyn AnswerGenerator> = Arc::new(ChatAnswerGenerator::new(
            inference_client,
            &config.model.model_name,
            config.model.temperature,
        ));
        let index_store: Arc<dyn IndexStore> = Arc::new(LocalIndexStore::new());

        // Create application services
        let orchestrator = Arc::new(QaOrchestrator::new(
            document_loader.clone(),
            embedding_provider.clone(),
            answer_generator.clone(),
            index_store.clone(),
            config.chunking,
            config.retrieval,
            config.index_location.clone(),
        )?);

        // Create use cases
        let build_index_use_case = Arc::new(BuildIndexUseCase::new(
            orchestrator.clone(),
            config.document_path.clone(),
        ));
        let ask_question_use_case = Arc::new(AskQuestionUseCase::new(orchestrator.clone()));
        let clear_history_use_case = Arc::new(ClearHistoryUseCase::new());

        // Create HTTP handlers
        let index_handler = Arc::new(IndexHandler::new(
            build_index_use_case.clone(),
            orchestrator.clone(),
        ));
        let chat_handler = Arc::new(ChatHandler::new(
            ask_question_use_case.clone(),
            clear_history_use_case.clone(),
        ));

        Ok(Self {
            config,
            document_loader,
            embedding_provider,
            answer_generator,
            index_store,
            orchestrator,
            build_index_use_case,
            ask_question_use_case,
            clear_history_use_case,
            index_handler,
            chat_handler,
        })
    }

    pub fn http_server(&self) -> HttpServer {
        HttpServer::new(
            self.index_handler.clone(),
            self.chat_handler.clone(),
            Some(self.config.port),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wires_default_config() {
        let container = AppContainer::new(AppConfig::default()).unwrap();

        assert_eq!(container.embedding_provider.model_name(), "text-embedding-ada-002");
        assert_eq!(
            container.answer_generator.model_info(),
            ("gpt-3.5-turbo".to_string(), 0.9)
        );
        assert_eq!(
            container.orchestrator.index_location(),
            std::path::Path::new("index_store_conveyor_manual")
        );
        assert!(!container.build_index_use_case.is_running());
    }

    #[test]
    fn test_rejects_invalid_api_base() {
        let mut config = AppConfig::default();
        config.model.api_base = "not a url".to_string();
        assert!(matches!(
            AppContainer::new(config),
            Err(QaError::InvalidConfig(_))
        ));
    }
}

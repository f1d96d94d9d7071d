use std::sync::Arc;

use crate::{
    application::{
        ports::{ChatModel, EmbeddingProvider, JobQueue, ReportRenderer, TextChunker},
        services::{DocumentProcessorService, FinancialAnalyzer, RagService, SearchService},
        use_cases::{
            GenerateReportUseCase, IngestDocumentUseCase, ManageConversationsUseCase, ManageDocumentsUseCase,
            ManageProcessosUseCase, ReviewTransacoesUseCase, SearchContentUseCase,
            SendMessageUseCase,
        },
    },
    config::AppConfig,
    domain::repositories::{
        ChunkRepository, ConversationRepository, DocumentRepository, ProcessoRepository,
        TransacaoRepository,
    },
    infrastructure::{
        database::{
            DbPool,
            repositories::{
                PostgresChunkRepository, PostgresConversationRepository,
                PostgresDocumentRepository, PostgresProcessoRepository,
                PostgresTransacaoRepository,
            },
        },
        external_services::{
            OpenAiChatModel, OpenAiClient, OpenAiClientConfig, OpenAiEmbeddingProvider,
            SentenceChunker, XlsxReportRenderer,
        },
        messaging::{BackgroundProcessor, MpscJobQueue},
    },
    presentation::http::{
        handlers::{
            ChatHandler, DocumentHandler, ProcessoHandler, ReportHandler, SearchHandler,
            SseHandler, TransacaoHandler,
        },
        server::{HttpHandlers, HttpServer},
    },
};

pub struct AppContainer {
    // Job Queue and Background Processing
    pub job_queue: Arc<MpscJobQueue>,
    pub background_processor: Arc<BackgroundProcessor>,

    // HTTP Handlers
    pub processo_handler: Arc<ProcessoHandler>,
    pub document_handler: Arc<DocumentHandler>,
    pub sse_handler: Arc<SseHandler>,
    pub search_handler: Arc<SearchHandler>,
    pub chat_handler: Arc<ChatHandler>,
    pub transacao_handler: Arc<TransacaoHandler>,
    pub report_handler: Arc<ReportHandler>,
}

impl AppContainer {
    pub fn new(config: &AppConfig, db_pool: DbPool) -> Result<Self, Box<dyn std::error::Error>> {
        // Create repositories
        let processo_repository: Arc<dyn ProcessoRepository> =
            Arc::new(PostgresProcessoRepository::new(db_pool.clone()));
        let document_repository: Arc<dyn DocumentRepository> =
            Arc::new(PostgresDocumentRepository::new(db_pool.clone()));
        let chunk_repository: Arc<dyn ChunkRepository> =
            Arc::new(PostgresChunkRepository::new(db_pool.clone()));
        let conversation_repository: Arc<dyn ConversationRepository> =
            Arc::new(PostgresConversationRepository::new(db_pool.clone()));
        let transacao_repository: Arc<dyn TransacaoRepository> =
            Arc::new(PostgresTransacaoRepository::new(db_pool));

        // Create external services
        let client = OpenAiClient::new(OpenAiClientConfig::from_settings(&config.models))
            .map_err(|e| format!("Failed to create model API client: {}", e))?;
        let embedding_provider: Arc<dyn EmbeddingProvider> =
            Arc::new(OpenAiEmbeddingProvider::new(
                client.clone(),
                config.models.embedding_model.clone(),
                config.models.embedding_dimensions,
            ));
        let chat_model: Arc<dyn ChatModel> = Arc::new(OpenAiChatModel::new(client));
        let report_renderer: Arc<dyn ReportRenderer> = Arc::new(XlsxReportRenderer::new());
        let chunker: Arc<dyn TextChunker> = Arc::new(SentenceChunker::new(
            config.rag.chunk_size,
            config.rag.chunk_overlap,
        ));

        // Create application services
        let search_service = Arc::new(SearchService::new(
            embedding_provider.clone(),
            chunk_repository.clone(),
            config.rag.top_k,
            config.rag.similarity_threshold,
        ));
        let rag_service = Arc::new(RagService::new(
            search_service.clone(),
            chat_model.clone(),
            config.models.chat_model.clone(),
            config.rag.history_window,
        ));
        let document_processor = Arc::new(DocumentProcessorService::new(
            document_repository.clone(),
            chunk_repository.clone(),
            embedding_provider,
            chunker,
        ));
        let financial_analyzer = Arc::new(FinancialAnalyzer::new(
            chat_model,
            config.models.processing_model.clone(),
            chunk_repository,
            transacao_repository.clone(),
            processo_repository.clone(),
        ));

        // Create job queue and background processor
        let (queue, job_receiver) = MpscJobQueue::create_pair();
        let job_queue = Arc::new(queue);
        let background_processor = Arc::new(
            BackgroundProcessor::new(
                Arc::new(job_receiver),
                document_repository.clone(),
                document_processor,
                financial_analyzer,
            )
            .with_worker_count(config.worker_count),
        );

        // Create use cases
        let processos_use_case = Arc::new(ManageProcessosUseCase::new(processo_repository.clone()));
        let queue_port: Arc<dyn JobQueue> = job_queue.clone();
        let ingest_use_case = Arc::new(IngestDocumentUseCase::new(
            processo_repository.clone(),
            document_repository.clone(),
            queue_port.clone(),
        ));
        let documents_use_case = Arc::new(ManageDocumentsUseCase::new(
            document_repository,
            queue_port,
        ));
        let search_content_use_case = Arc::new(SearchContentUseCase::new(search_service));
        let conversations_use_case = Arc::new(ManageConversationsUseCase::new(
            conversation_repository.clone(),
            processo_repository.clone(),
        ));
        let send_message_use_case = Arc::new(SendMessageUseCase::new(
            conversation_repository,
            processo_repository.clone(),
            rag_service,
        ));
        let report_use_case = Arc::new(GenerateReportUseCase::new(
            processo_repository,
            transacao_repository.clone(),
            report_renderer,
        ));
        let review_use_case = Arc::new(ReviewTransacoesUseCase::new(transacao_repository));

        // Create HTTP handlers
        let processo_handler = Arc::new(ProcessoHandler::new(processos_use_case));
        let document_handler = Arc::new(DocumentHandler::new(
            ingest_use_case,
            documents_use_case.clone(),
        ));
        let sse_handler = Arc::new(SseHandler::new(documents_use_case));
        let search_handler = Arc::new(SearchHandler::new(search_content_use_case));
        let chat_handler = Arc::new(ChatHandler::new(
            conversations_use_case,
            send_message_use_case,
        ));
        let transacao_handler = Arc::new(TransacaoHandler::new(review_use_case));
        let report_handler = Arc::new(ReportHandler::new(report_use_case));

        Ok(Self {
            job_queue,
            background_processor,
            processo_handler,
            document_handler,
            sse_handler,
            search_handler,
            chat_handler,
            transacao_handler,
            report_handler,
        })
    }

    pub fn into_server(self, config: &AppConfig) -> HttpServer {
        let handlers = HttpHandlers {
            processo_handler: self.processo_handler,
            document_handler: self.document_handler,
            sse_handler: self.sse_handler,
            search_handler: self.search_handler,
            chat_handler: self.chat_handler,
            transacao_handler: self.transacao_handler,
            report_handler: self.report_handler,
        };

        HttpServer::new(
            handlers,
            self.job_queue,
            self.background_processor,
            config.port,
            config.frontend_url.clone(),
            config.max_body_bytes,
        )
    }
}

use axum::{Router, extract::DefaultBodyLimit, http::HeaderValue};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::infrastructure::messaging::{BackgroundProcessor, MpscJobQueue};
use crate::presentation::http::{
    handlers::{
        ChatHandler, DocumentHandler, ProcessoHandler, ReportHandler, SearchHandler, SseHandler,
        TransacaoHandler,
    },
    routes::{
        chat_routes, document_routes, health_routes, processo_routes, report_routes,
        search_routes, transacao_routes,
    },
};

/// Raises axum's built-in extractor limit along with the transport limit,
/// so large extracted texts reach the JSON extractor.
fn with_body_limit(router: Router, max_body_bytes: usize) -> Router {
    router
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
}

pub struct HttpHandlers {
    pub processo_handler: Arc<ProcessoHandler>,
    pub document_handler: Arc<DocumentHandler>,
    pub sse_handler: Arc<SseHandler>,
    pub search_handler: Arc<SearchHandler>,
    pub chat_handler: Arc<ChatHandler>,
    pub transacao_handler: Arc<TransacaoHandler>,
    pub report_handler: Arc<ReportHandler>,
}

pub struct HttpServer {
    handlers: HttpHandlers,
    job_queue: Arc<MpscJobQueue>,
    background_processor: Arc<BackgroundProcessor>,
    port: u16,
    frontend_url: String,
    max_body_bytes: usize,
}

impl HttpServer {
    pub fn new(
        handlers: HttpHandlers,
        job_queue: Arc<MpscJobQueue>,
        background_processor: Arc<BackgroundProcessor>,
        port: u16,
        frontend_url: String,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            handlers,
            job_queue,
            background_processor,
            port,
            frontend_url,
            max_body_bytes,
        }
    }

    pub fn router(&self) -> Router {
        let api = Router::new()
            .merge(health_routes(self.job_queue.clone()))
            .merge(processo_routes(self.handlers.processo_handler.clone()))
            .merge(document_routes(
                self.handlers.document_handler.clone(),
                self.handlers.sse_handler.clone(),
            ))
            .merge(search_routes(self.handlers.search_handler.clone()))
            .merge(chat_routes(self.handlers.chat_handler.clone()))
            .merge(transacao_routes(self.handlers.transacao_handler.clone()))
            .merge(report_routes(self.handlers.report_handler.clone()));

        with_body_limit(Router::new().nest("/api", api), self.max_body_bytes)
            .layer(self.cors_layer())
            .layer(
                TraceLayer::new_for_http()
                    .on_request(
                        |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                            tracing::info!(
                                "Received request: {} {}",
                                request.method(),
                                request.uri()
                            );
                        },
                    )
                    .on_response(
                        |response: &axum::http::Response<axum::body::Body>,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::info!(
                                "Response: {} (took {} ms)",
                                response.status(),
                                latency.as_millis()
                            );
                        },
                    )
                    .on_failure(
                        |error: ServerErrorsFailureClass,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::error!(
                                "Request failed: {:?} (took {} ms)",
                                error,
                                latency.as_millis()
                            );
                        },
                    ),
            )
    }

    fn cors_layer(&self) -> CorsLayer {
        let origin = match self.frontend_url.parse::<HeaderValue>() {
            Ok(origin) => AllowOrigin::exact(origin),
            Err(e) => {
                tracing::warn!(
                    "Invalid FRONTEND_URL {:?} ({}), allowing any origin",
                    self.frontend_url,
                    e
                );
                AllowOrigin::any()
            }
        };

        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any)
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let background_processor = self.background_processor.clone();
        tokio::spawn(async move {
            background_processor.start().await;
        });

        let app = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        tracing::info!("Listening on {}", addr);
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::application::services::document_processor::test_support::FakeDocuments;
    use crate::application::use_cases::test_support::{FakeProcessos, FakeQueue, processo};
    use crate::application::use_cases::{IngestDocumentUseCase, ManageDocumentsUseCase};

    fn documents_app(max_body_bytes: usize) -> (Router, uuid::Uuid) {
        let existing = processo();
        let processo_id = existing.id;
        let documents = Arc::new(FakeDocuments::default());
        let queue = Arc::new(FakeQueue::default());
        let ingest = Arc::new(IngestDocumentUseCase::new(
            Arc::new(FakeProcessos::with(vec![existing])),
            documents.clone(),
            queue.clone(),
        ));
        let manage = Arc::new(ManageDocumentsUseCase::new(documents, queue));
        let api = document_routes(
            Arc::new(DocumentHandler::new(ingest, manage.clone())),
            Arc::new(SseHandler::new(manage)),
        );
        (
            with_body_limit(Router::new().nest("/api", api), max_body_bytes),
            processo_id,
        )
    }

    fn create_request(processo_id: uuid::Uuid, text_len: usize) -> Request<Body> {
        let payload = serde_json::json!({
            "processo_id": processo_id,
            "user_id": uuid::Uuid::new_v4(),
            "kind": "extrato_bancario",
            "title": "Extrato anual",
            "text": "Pix recebido. ".repeat(text_len / 14),
        });
        Request::post("/api/documents")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&payload).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_accepts_text_above_axum_default_limit() {
        let (app, processo_id) = documents_app(50 * 1024 * 1024);

        let response = app
            .oneshot(create_request(processo_id, 3_000_000))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_rejects_body_above_configured_limit() {
        let (app, processo_id) = documents_app(1024 * 1024);

        let response = app
            .oneshot(create_request(processo_id, 3_000_000))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

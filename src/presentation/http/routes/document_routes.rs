use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::{DocumentHandler, SseHandler};

pub fn document_routes(
    document_handler: Arc<DocumentHandler>,
    sse_handler: Arc<SseHandler>,
) -> Router {
    let documents = Router::new()
        .route(
            "/documents",
            get(DocumentHandler::list_documents).post(DocumentHandler::create_document),
        )
        .route("/documents/search", get(DocumentHandler::search_documents))
        .route(
            "/documents/{document_id}",
            get(DocumentHandler::get_document)
                .patch(DocumentHandler::update_document)
                .delete(DocumentHandler::delete_document),
        )
        .route(
            "/documents/{document_id}/reprocess",
            post(DocumentHandler::reprocess_document),
        )
        .with_state(document_handler);

    let events = Router::new()
        .route(
            "/documents/{document_id}/events",
            get(SseHandler::document_events),
        )
        .with_state(sse_handler);

    documents.merge(events)
}

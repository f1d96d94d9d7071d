use axum::{Router, routing::get};
use std::sync::Arc;

use crate::presentation::http::handlers::ProcessoHandler;

pub fn processo_routes(processo_handler: Arc<ProcessoHandler>) -> Router {
    Router::new()
        .route(
            "/processos",
            get(ProcessoHandler::list_processos).post(ProcessoHandler::create_processo),
        )
        .route(
            "/processos/{processo_id}",
            get(ProcessoHandler::get_processo)
                .put(ProcessoHandler::update_processo)
                .delete(ProcessoHandler::delete_processo),
        )
        .with_state(processo_handler)
}

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::TransacaoHandler;

pub fn transacao_routes(transacao_handler: Arc<TransacaoHandler>) -> Router {
    Router::new()
        .route("/transacoes", get(TransacaoHandler::list_transacoes))
        .route("/transacoes/summary", get(TransacaoHandler::summary))
        .route(
            "/transacoes/{transacao_id}",
            get(TransacaoHandler::get_transacao).put(TransacaoHandler::update_transacao),
        )
        .route(
            "/transacoes/{transacao_id}/confirm",
            post(TransacaoHandler::confirm_transacao),
        )
        .with_state(transacao_handler)
}

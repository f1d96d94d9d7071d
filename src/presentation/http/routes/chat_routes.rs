use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::ChatHandler;

pub fn chat_routes(chat_handler: Arc<ChatHandler>) -> Router {
    Router::new()
        .route(
            "/chat/conversations",
            get(ChatHandler::list_conversations).post(ChatHandler::create_conversation),
        )
        .route(
            "/chat/conversations/{conversation_id}",
            get(ChatHandler::get_conversation),
        )
        .route("/chat/message", post(ChatHandler::send_message))
        .route("/chat/stream", post(ChatHandler::stream_message))
        .route("/chat/sources/{message_id}", get(ChatHandler::message_sources))
        .with_state(chat_handler)
}

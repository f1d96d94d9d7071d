use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, sse::Event},
};
use futures::stream;
use std::{convert::Infallible, sync::Arc};
use uuid::Uuid;

use super::sse_handler::create_sse_response;
use crate::application::use_cases::{ManageConversationsUseCase, SendMessageUseCase};
use crate::presentation::http::dto::{
    ChatResponseDto, ConversationHistoryDto, ConversationListQuery, ConversationListResponseDto,
    ConversationResponseDto, CreateConversationDto, SendMessageDto, SourcesResponseDto,
    error_response, success_response,
};

pub struct ChatHandler {
    conversations_use_case: Arc<ManageConversationsUseCase>,
    send_message_use_case: Arc<SendMessageUseCase>,
}

impl ChatHandler {
    pub fn new(
        conversations_use_case: Arc<ManageConversationsUseCase>,
        send_message_use_case: Arc<SendMessageUseCase>,
    ) -> Self {
        Self {
            conversations_use_case,
            send_message_use_case,
        }
    }

    pub async fn create_conversation(
        State(handler): State<Arc<ChatHandler>>,
        Json(payload): Json<CreateConversationDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler
            .conversations_use_case
            .create(payload.processo_id, payload.user_id, payload.title)
            .await
        {
            Ok(conversation) => Ok(success_response(
                StatusCode::CREATED,
                ConversationResponseDto::from(conversation),
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn list_conversations(
        State(handler): State<Arc<ChatHandler>>,
        Query(query): Query<ConversationListQuery>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler
            .conversations_use_case
            .list(query.user_id, query.processo_id)
            .await
        {
            Ok(summaries) => {
                let conversations: Vec<ConversationResponseDto> = summaries
                    .into_iter()
                    .map(ConversationResponseDto::from)
                    .collect();
                Ok(success_response(
                    StatusCode::OK,
                    ConversationListResponseDto {
                        total: conversations.len(),
                        conversations,
                    },
                ))
            }
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn get_conversation(
        State(handler): State<Arc<ChatHandler>>,
        Path(conversation_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.conversations_use_case.history(conversation_id).await {
            Ok(history) => Ok(success_response(
                StatusCode::OK,
                ConversationHistoryDto::from(history),
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn message_sources(
        State(handler): State<Arc<ChatHandler>>,
        Path(message_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.conversations_use_case.sources(message_id).await {
            Ok(sources) => Ok(success_response(
                StatusCode::OK,
                SourcesResponseDto { sources },
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn send_message(
        State(handler): State<Arc<ChatHandler>>,
        Json(payload): Json<SendMessageDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler
            .send_message_use_case
            .execute(payload.conversation_id, &payload.content)
            .await
        {
            Ok(exchange) => Ok(success_response(
                StatusCode::OK,
                ChatResponseDto::from(exchange),
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    /// Same turn as `send_message`, answered as server-sent events. Errors
    /// found before generation starts are plain JSON responses.
    pub async fn stream_message(
        State(handler): State<Arc<ChatHandler>>,
        Json(payload): Json<SendMessageDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let receiver = match handler
            .send_message_use_case
            .start_stream(payload.conversation_id, &payload.content)
            .await
        {
            Ok(receiver) => receiver,
            Err(e) => return Ok(error_response(&e)),
        };

        let events = stream::unfold(receiver, |mut receiver| async move {
            let event = receiver.recv().await?;
            let sse = Event::default()
                .event(event.name())
                .data(serde_json::to_string(&event).unwrap_or_default());
            Some((Ok::<_, Infallible>(sse), receiver))
        });

        Ok(create_sse_response(events))
    }
}

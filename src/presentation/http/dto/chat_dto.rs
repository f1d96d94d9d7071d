use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::use_cases::{ChatExchange, ConversationHistory, ConversationSummary};
use crate::domain::entities::{Conversation, Message, SourceInfo};
use crate::domain::value_objects::MessageRole;

#[derive(Debug, Deserialize)]
pub struct CreateConversationDto {
    pub processo_id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationListQuery {
    pub user_id: Option<Uuid>,
    pub processo_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageDto {
    pub conversation_id: Uuid,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponseDto {
    pub id: Uuid,
    pub processo_id: Uuid,
    pub user_id: Uuid,
    pub channel: String,
    pub title: Option<String>,
    pub message_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationResponseDto {
    fn build(conversation: Conversation, message_count: i64) -> Self {
        Self {
            id: conversation.id,
            processo_id: conversation.processo_id,
            user_id: conversation.user_id,
            channel: conversation.channel,
            title: conversation.title,
            message_count,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }
    }
}

impl From<Conversation> for ConversationResponseDto {
    fn from(conversation: Conversation) -> Self {
        Self::build(conversation, 0)
    }
}

impl From<ConversationSummary> for ConversationResponseDto {
    fn from(summary: ConversationSummary) -> Self {
        Self::build(summary.conversation, summary.message_count)
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationListResponseDto {
    pub conversations: Vec<ConversationResponseDto>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ChatMessageDto {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub tokens_input: Option<i32>,
    pub tokens_output: Option<i32>,
    pub cost_usd: Option<f64>,
    pub sources: Vec<SourceInfo>,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for ChatMessageDto {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            role: message.role,
            content: message.content,
            tokens_input: message.tokens_input,
            tokens_output: message.tokens_output,
            cost_usd: message.cost_usd,
            sources: message.sources,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponseDto {
    pub user_message: ChatMessageDto,
    pub sources: Vec<SourceInfo>,
    pub assistant_message: ChatMessageDto,
}

impl From<ChatExchange> for ChatResponseDto {
    fn from(exchange: ChatExchange) -> Self {
        Self {
            sources: exchange.assistant_message.sources.clone(),
            user_message: ChatMessageDto::from(exchange.user_message),
            assistant_message: ChatMessageDto::from(exchange.assistant_message),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationHistoryDto {
    pub conversation: ConversationResponseDto,
    pub messages: Vec<ChatMessageDto>,
}

impl From<ConversationHistory> for ConversationHistoryDto {
    fn from(history: ConversationHistory) -> Self {
        let message_count = history.messages.len() as i64;
        Self {
            conversation: ConversationResponseDto::build(history.conversation, message_count),
            messages: history.messages.into_iter().map(ChatMessageDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SourcesResponseDto {
    pub sources: Vec<SourceInfo>,
}

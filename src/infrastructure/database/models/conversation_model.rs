use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::{Conversation, Message, SourceInfo};
use crate::domain::repositories::RepositoryError;
use crate::domain::value_objects::MessageRole;
use crate::infrastructure::database::schema::{conversations, messages};

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Identifiable)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ConversationModel {
    pub id: Uuid,
    pub processo_id: Uuid,
    pub user_id: Uuid,
    pub channel: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Conversation> for ConversationModel {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id,
            processo_id: conversation.processo_id,
            user_id: conversation.user_id,
            channel: conversation.channel.clone(),
            title: conversation.title.clone(),
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }
    }
}

impl From<ConversationModel> for Conversation {
    fn from(model: ConversationModel) -> Self {
        Conversation {
            id: model.id,
            processo_id: model.processo_id,
            user_id: model.user_id,
            channel: model.channel,
            title: model.title,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Identifiable, Associations)]
#[diesel(belongs_to(ConversationModel, foreign_key = conversation_id))]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageModel {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: String,
    pub content: String,
    pub chunks_used: Option<Vec<Uuid>>,
    pub tokens_input: Option<i32>,
    pub tokens_output: Option<i32>,
    pub cost_usd: Option<f64>,
    pub sources: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&Message> for MessageModel {
    type Error = RepositoryError;

    fn try_from(message: &Message) -> Result<Self, Self::Error> {
        let sources = serde_json::to_value(&message.sources)
            .map_err(|e| RepositoryError::ValidationError(e.to_string()))?;

        Ok(Self {
            id: message.id,
            conversation_id: message.conversation_id,
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
            chunks_used: Some(message.chunks_used.clone()),
            tokens_input: message.tokens_input,
            tokens_output: message.tokens_output,
            cost_usd: message.cost_usd,
            sources,
            created_at: message.created_at,
        })
    }
}

impl TryFrom<MessageModel> for Message {
    type Error = RepositoryError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        let role = MessageRole::from_string(&model.role).map_err(RepositoryError::ValidationError)?;
        let sources: Vec<SourceInfo> = serde_json::from_value(model.sources).unwrap_or_default();

        Ok(Message {
            id: model.id,
            conversation_id: model.conversation_id,
            role,
            content: model.content,
            chunks_used: model.chunks_used.unwrap_or_default(),
            tokens_input: model.tokens_input,
            tokens_output: model.tokens_output,
            cost_usd: model.cost_usd,
            sources,
            created_at: model.created_at,
        })
    }
}

use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::entities::{Conversation, Message};

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn save(&self, conversation: &Conversation) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>, RepositoryError>;
    async fn list(
        &self,
        user_id: Option<Uuid>,
        processo_id: Option<Uuid>,
    ) -> Result<Vec<Conversation>, RepositoryError>;
    /// Message count per conversation; conversations without messages are absent.
    async fn message_counts(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, i64>, RepositoryError>;
    async fn update_title(&self, id: Uuid, title: &str) -> Result<(), RepositoryError>;
    async fn save_message(&self, message: &Message) -> Result<(), RepositoryError>;
    async fn find_message(&self, id: Uuid) -> Result<Option<Message>, RepositoryError>;
    /// All messages of a conversation, oldest first.
    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, RepositoryError>;
    /// The newest `limit` messages, returned oldest first.
    async fn recent_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>, RepositoryError>;
}

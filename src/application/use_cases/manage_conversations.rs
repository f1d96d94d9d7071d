use std::sync::Arc;
use uuid::Uuid;

use super::UseCaseError;
use crate::domain::entities::{Conversation, Message, SourceInfo};
use crate::domain::repositories::{ConversationRepository, ProcessoRepository};

#[derive(Debug, Clone)]
pub struct ConversationSummary {
    pub conversation: Conversation,
    pub message_count: i64,
}

#[derive(Debug, Clone)]
pub struct ConversationHistory {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

pub struct ManageConversationsUseCase {
    conversation_repository: Arc<dyn ConversationRepository>,
    processo_repository: Arc<dyn ProcessoRepository>,
}

impl ManageConversationsUseCase {
    pub fn new(
        conversation_repository: Arc<dyn ConversationRepository>,
        processo_repository: Arc<dyn ProcessoRepository>,
    ) -> Self {
        Self {
            conversation_repository,
            processo_repository,
        }
    }

    pub async fn create(
        &self,
        processo_id: Uuid,
        user_id: Uuid,
        title: Option<String>,
    ) -> Result<Conversation, UseCaseError> {
        if self.processo_repository.find_by_id(processo_id).await?.is_none() {
            return Err(UseCaseError::not_found("Processo", processo_id));
        }

        let conversation = Conversation::new(processo_id, user_id, title);
        self.conversation_repository.save(&conversation).await?;
        Ok(conversation)
    }

    /// Most recently active first.
    pub async fn list(
        &self,
        user_id: Option<Uuid>,
        processo_id: Option<Uuid>,
    ) -> Result<Vec<ConversationSummary>, UseCaseError> {
        let conversations = self.conversation_repository.list(user_id, processo_id).await?;
        let ids: Vec<Uuid> = conversations.iter().map(|c| c.id).collect();
        let counts = self.conversation_repository.message_counts(&ids).await?;

        Ok(conversations
            .into_iter()
            .map(|conversation| ConversationSummary {
                message_count: counts.get(&conversation.id).copied().unwrap_or(0),
                conversation,
            })
            .collect())
    }

    pub async fn history(&self, id: Uuid) -> Result<ConversationHistory, UseCaseError> {
        let conversation = self
            .conversation_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UseCaseError::not_found("Conversation", id))?;
        let messages = self.conversation_repository.list_messages(id).await?;

        Ok(ConversationHistory {
            conversation,
            messages,
        })
    }

    pub async fn sources(&self, message_id: Uuid) -> Result<Vec<SourceInfo>, UseCaseError> {
        let message = self
            .conversation_repository
            .find_message(message_id)
            .await?
            .ok_or_else(|| UseCaseError::not_found("Message", message_id))?;
        Ok(message.sources)
    }
}

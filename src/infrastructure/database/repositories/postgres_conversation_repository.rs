use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::entities::{Conversation, Message};
use crate::domain::repositories::{ConversationRepository, RepositoryError};
use crate::infrastructure::database::models::{ConversationModel, MessageModel};
use crate::infrastructure::database::schema::{conversations, messages};
use crate::infrastructure::database::{DbPool, with_connection};

pub struct PostgresConversationRepository {
    pool: DbPool,
}

impl PostgresConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_messages(models: Vec<MessageModel>) -> Result<Vec<Message>, RepositoryError> {
    models.into_iter().map(Message::try_from).collect()
}

#[async_trait]
impl ConversationRepository for PostgresConversationRepository {
    async fn save(&self, conversation: &Conversation) -> Result<(), RepositoryError> {
        let model = ConversationModel::from(conversation);

        with_connection(&self.pool, move |conn| {
            diesel::insert_into(conversations::table)
                .values(&model)
                .execute(conn)
                .map(|_| ())
        })
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>, RepositoryError> {
        let model = with_connection(&self.pool, move |conn| {
            conversations::table
                .find(id)
                .select(ConversationModel::as_select())
                .first(conn)
                .optional()
        })
        .await?;

        Ok(model.map(Conversation::from))
    }

    async fn list(
        &self,
        user_id: Option<Uuid>,
        processo_id: Option<Uuid>,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let models = with_connection(&self.pool, move |conn| {
            let mut query = conversations::table
                .select(ConversationModel::as_select())
                .order(conversations::updated_at.desc())
                .into_boxed();
            if let Some(user) = user_id {
                query = query.filter(conversations::user_id.eq(user));
            }
            if let Some(processo) = processo_id {
                query = query.filter(conversations::processo_id.eq(processo));
            }
            query.load(conn)
        })
        .await?;

        Ok(models.into_iter().map(Conversation::from).collect())
    }

    async fn message_counts(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, i64>, RepositoryError> {
        let ids = ids.to_vec();

        let rows = with_connection(&self.pool, move |conn| {
            messages::table
                .filter(messages::conversation_id.eq_any(ids))
                .group_by(messages::conversation_id)
                .select((messages::conversation_id, count_star()))
                .load::<(Uuid, i64)>(conn)
        })
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn update_title(&self, id: Uuid, title: &str) -> Result<(), RepositoryError> {
        let title = title.to_string();

        let updated = with_connection(&self.pool, move |conn| {
            diesel::update(conversations::table.find(id))
                .set((
                    conversations::title.eq(title),
                    conversations::updated_at.eq(Utc::now()),
                ))
                .execute(conn)
        })
        .await?;

        if updated == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    async fn save_message(&self, message: &Message) -> Result<(), RepositoryError> {
        let model = MessageModel::try_from(message)?;
        let conversation_id = message.conversation_id;

        with_connection(&self.pool, move |conn| {
            conn.transaction(|conn| {
                diesel::insert_into(messages::table)
                    .values(&model)
                    .execute(conn)?;
                diesel::update(conversations::table.find(conversation_id))
                    .set(conversations::updated_at.eq(Utc::now()))
                    .execute(conn)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_message(&self, id: Uuid) -> Result<Option<Message>, RepositoryError> {
        let model = with_connection(&self.pool, move |conn| {
            messages::table
                .find(id)
                .select(MessageModel::as_select())
                .first(conn)
                .optional()
        })
        .await?;

        model.map(Message::try_from).transpose()
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, RepositoryError> {
        let models = with_connection(&self.pool, move |conn| {
            messages::table
                .filter(messages::conversation_id.eq(conversation_id))
                .order(messages::created_at.asc())
                .select(MessageModel::as_select())
                .load(conn)
        })
        .await?;

        into_messages(models)
    }

    async fn recent_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>, RepositoryError> {
        let mut models = with_connection(&self.pool, move |conn| {
            messages::table
                .filter(messages::conversation_id.eq(conversation_id))
                .order(messages::created_at.desc())
                .limit(limit)
                .select(MessageModel::as_select())
                .load(conn)
        })
        .await?;

        models.reverse();
        into_messages(models)
    }
}

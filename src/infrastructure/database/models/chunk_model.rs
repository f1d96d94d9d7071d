use chrono::{DateTime, Utc};
use diesel::prelude::*;
use pgvector::Vector;
use uuid::Uuid;

use crate::domain::entities::Chunk;
use crate::infrastructure::database::schema::chunks;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(belongs_to(super::DocumentModel, foreign_key = document_id))]
#[diesel(table_name = chunks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChunkModel {
    pub id: Uuid,
    pub document_id: Uuid,
    pub content: String,
    pub position: i32,
    pub token_count: Option<i32>,
    pub embedding: Option<Vector>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = chunks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewChunkModel {
    pub id: Uuid,
    pub document_id: Uuid,
    pub content: String,
    pub position: i32,
    pub token_count: Option<i32>,
    pub embedding: Option<Vector>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<&Chunk> for NewChunkModel {
    fn from(chunk: &Chunk) -> Self {
        Self {
            id: chunk.id(),
            document_id: chunk.document_id(),
            content: chunk.content().to_string(),
            position: chunk.position(),
            token_count: chunk.token_count(),
            embedding: chunk.embedding().cloned(),
            metadata: chunk.metadata().clone(),
            created_at: chunk.created_at(),
        }
    }
}

impl From<ChunkModel> for Chunk {
    fn from(model: ChunkModel) -> Self {
        Chunk::from_database(
            model.id,
            model.document_id,
            model.content,
            model.position,
            model.token_count,
            model.embedding,
            model.metadata,
            model.created_at,
        )
    }
}

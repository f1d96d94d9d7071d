use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::entities::Document;
use crate::domain::value_objects::{ContentHash, DocumentStatus};

#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub processo_id: Option<Uuid>,
    pub kind: Option<String>,
    pub status: Option<DocumentStatus>,
    pub skip: i64,
    pub limit: i64,
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn save(&self, document: &Document) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, RepositoryError>;
    async fn find_by_hash(
        &self,
        processo_id: Uuid,
        hash: &ContentHash,
    ) -> Result<Option<Document>, RepositoryError>;
    async fn list(&self, filter: &DocumentFilter) -> Result<Vec<Document>, RepositoryError>;
    /// Case-insensitive substring match over extracted text.
    async fn search_text(
        &self,
        processo_id: Uuid,
        query: &str,
        limit: i64,
    ) -> Result<Vec<Document>, RepositoryError>;
    /// Writes only the status columns, leaving caller edits untouched.
    async fn update_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
        error_message: Option<String>,
    ) -> Result<(), RepositoryError>;
    /// Writes the document's title, kind and reference date and merges
    /// `chunk_patch` into the metadata of each of its chunks in the same
    /// transaction. Status columns are not touched.
    async fn update_with_chunk_metadata(
        &self,
        document: &Document,
        chunk_patch: &serde_json::Value,
    ) -> Result<(), RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

use async_trait::async_trait;
use pgvector::Vector;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::entities::{Chunk, RetrievedChunk};

#[derive(Debug, Clone)]
pub struct SimilarityQuery {
    pub vector: Vector,
    pub processo_id: Option<Uuid>,
    pub limit: i64,
    pub threshold: Option<f32>,
}

#[async_trait]
pub trait ChunkRepository: Send + Sync {
    /// Drops every existing chunk of the document and inserts `chunks`
    /// atomically.
    async fn replace_for_document(
        &self,
        document_id: Uuid,
        chunks: &[Chunk],
    ) -> Result<(), RepositoryError>;
    async fn find_by_document(&self, document_id: Uuid) -> Result<Vec<Chunk>, RepositoryError>;
    async fn count_by_document(&self, document_id: Uuid) -> Result<i64, RepositoryError>;
    /// Chunks of processed documents ordered by cosine distance to the query.
    async fn similarity_search(
        &self,
        query: &SimilarityQuery,
    ) -> Result<Vec<RetrievedChunk>, RepositoryError>;
}

use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::entities::Processo;

#[async_trait]
pub trait ProcessoRepository: Send + Sync {
    async fn save(&self, processo: &Processo) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Processo>, RepositoryError>;
    async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<Processo>, RepositoryError>;
    /// Writes the editable fields and `updated_at`.
    async fn update(&self, processo: &Processo) -> Result<(), RepositoryError>;
    async fn count_documents(&self, id: Uuid) -> Result<i64, RepositoryError>;
    /// Removes the processo with its documents, chunks, transactions and
    /// conversations.
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

use std::sync::Arc;
use uuid::Uuid;

use super::UseCaseError;
use crate::domain::entities::{Processo, ProcessoChanges};
use crate::domain::repositories::ProcessoRepository;

#[derive(Debug, Clone)]
pub struct CreateProcessoRequest {
    pub owner_id: Uuid,
    pub numero: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProcessoDetails {
    pub processo: Processo,
    pub document_count: i64,
}

pub struct ManageProcessosUseCase {
    processo_repository: Arc<dyn ProcessoRepository>,
}

impl ManageProcessosUseCase {
    pub fn new(processo_repository: Arc<dyn ProcessoRepository>) -> Self {
        Self { processo_repository }
    }

    pub async fn create(&self, request: CreateProcessoRequest) -> Result<Processo, UseCaseError> {
        let processo = Processo::new(
            request.owner_id,
            request.numero.filter(|n| !n.trim().is_empty()),
            request.title,
            request.description,
            request.context,
        )
        .map_err(UseCaseError::ValidationError)?;

        self.processo_repository.save(&processo).await?;
        tracing::info!("Created processo {} ({})", processo.id, processo.title);
        Ok(processo)
    }

    pub async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<Processo>, UseCaseError> {
        Ok(self.processo_repository.list(owner_id).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<ProcessoDetails, UseCaseError> {
        let processo = self
            .processo_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UseCaseError::not_found("Processo", id))?;
        let document_count = self.processo_repository.count_documents(id).await?;

        Ok(ProcessoDetails {
            processo,
            document_count,
        })
    }

    /// Edits the processo. A new context applies to the next chat turn and
    /// the next transaction extraction.
    pub async fn update(&self, id: Uuid, changes: ProcessoChanges) -> Result<ProcessoDetails, UseCaseError> {
        if changes.is_empty() {
            return Err(UseCaseError::ValidationError("No changes provided".to_string()));
        }

        let mut details = self.get(id).await?;
        details
            .processo
            .apply_changes(&changes)
            .map_err(UseCaseError::ValidationError)?;
        self.processo_repository.update(&details.processo).await?;

        tracing::info!("Updated processo {}", id);
        Ok(details)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), UseCaseError> {
        if !self.processo_repository.delete(id).await? {
            return Err(UseCaseError::not_found("Processo", id));
        }
        tracing::info!("Deleted processo {}", id);
        Ok(())
    }
}

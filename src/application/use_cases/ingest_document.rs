use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use super::UseCaseError;
use crate::application::ports::{DocumentJob, JobQueue};
use crate::domain::entities::Document;
use crate::domain::repositories::{DocumentRepository, ProcessoRepository, RepositoryError};
use crate::domain::value_objects::ContentHash;

#[derive(Debug, Clone)]
pub struct IngestDocumentRequest {
    pub processo_id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub description: Option<String>,
    pub participants: Option<Vec<String>>,
    pub reference_date: Option<NaiveDate>,
    pub text: String,
}

pub struct IngestDocumentUseCase {
    processo_repository: Arc<dyn ProcessoRepository>,
    document_repository: Arc<dyn DocumentRepository>,
    job_queue: Arc<dyn JobQueue>,
}

impl IngestDocumentUseCase {
    pub fn new(
        processo_repository: Arc<dyn ProcessoRepository>,
        document_repository: Arc<dyn DocumentRepository>,
        job_queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            processo_repository,
            document_repository,
            job_queue,
        }
    }

    /// Stores the document as `uploaded` and queues it for chunking and
    /// embedding.
    pub async fn execute(&self, request: IngestDocumentRequest) -> Result<Document, UseCaseError> {
        if request.text.trim().is_empty() {
            return Err(UseCaseError::ValidationError(
                "Document text cannot be empty".to_string(),
            ));
        }

        if self
            .processo_repository
            .find_by_id(request.processo_id)
            .await?
            .is_none()
        {
            return Err(UseCaseError::not_found("Processo", request.processo_id));
        }

        let hash = ContentHash::of_text(&request.text);
        if let Some(existing) = self
            .document_repository
            .find_by_hash(request.processo_id, &hash)
            .await?
        {
            return Err(UseCaseError::Conflict(format!(
                "Document with the same content already exists: {}",
                existing.id()
            )));
        }

        let document = Document::new(
            request.processo_id,
            request.user_id,
            request.kind,
            request.title,
            request.description,
            request.participants,
            request.reference_date,
            request.text,
        )
        .map_err(UseCaseError::ValidationError)?;

        self.document_repository
            .save(&document)
            .await
            .map_err(|e| match e {
                RepositoryError::DuplicateError(_) => UseCaseError::Conflict(
                    "Document with the same content already exists".to_string(),
                ),
                other => other.into(),
            })?;
        self.job_queue
            .enqueue(DocumentJob::Process(document.id()))
            .await?;

        tracing::info!(
            "Registered document {} ({}) for processo {}",
            document.id(),
            document.kind(),
            document.processo_id()
        );
        Ok(document)
    }
}

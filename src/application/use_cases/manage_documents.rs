use std::sync::Arc;
use uuid::Uuid;

use super::UseCaseError;
use crate::application::ports::{DocumentJob, JobQueue};
use crate::domain::entities::{Document, DocumentChanges};
use crate::domain::repositories::{DocumentFilter, DocumentRepository};
use crate::domain::value_objects::DocumentStatus;

pub const TEXT_SEARCH_LIMIT: i64 = 20;
const EXCERPT_RADIUS: usize = 100;
const FALLBACK_EXCERPT_CHARS: usize = 200;
const DEFAULT_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone)]
pub struct TextSearchHit {
    pub document_id: Uuid,
    pub title: String,
    pub kind: String,
    pub excerpt: String,
}

#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub document: Document,
    /// Set when the change made the document financial and extraction was queued.
    pub analysis_queued: bool,
}

pub struct ManageDocumentsUseCase {
    document_repository: Arc<dyn DocumentRepository>,
    job_queue: Arc<dyn JobQueue>,
}

impl ManageDocumentsUseCase {
    pub fn new(document_repository: Arc<dyn DocumentRepository>, job_queue: Arc<dyn JobQueue>) -> Self {
        Self {
            document_repository,
            job_queue,
        }
    }

    pub async fn list(&self, mut filter: DocumentFilter) -> Result<Vec<Document>, UseCaseError> {
        if filter.skip < 0 {
            return Err(UseCaseError::ValidationError("skip cannot be negative".to_string()));
        }
        if filter.limit <= 0 {
            filter.limit = DEFAULT_PAGE_SIZE;
        }
        Ok(self.document_repository.list(&filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Document, UseCaseError> {
        self.document_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UseCaseError::not_found("Document", id))
    }

    pub async fn status(&self, id: Uuid) -> Result<(DocumentStatus, Option<String>), UseCaseError> {
        let document = self.get(id).await?;
        Ok((document.status(), document.error_message().map(str::to_string)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), UseCaseError> {
        if !self.document_repository.delete(id).await? {
            return Err(UseCaseError::not_found("Document", id));
        }
        tracing::info!("Deleted document {}", id);
        Ok(())
    }

    pub async fn reprocess(&self, id: Uuid) -> Result<Document, UseCaseError> {
        let document = self.get(id).await?;
        self.job_queue.enqueue(DocumentJob::Process(id)).await?;
        tracing::info!("Queued document {} for reprocessing (was {})", id, document.status());
        Ok(document)
    }

    /// Applies title, kind and reference date changes to the document and
    /// mirrors them into its chunks' metadata.
    pub async fn update(&self, id: Uuid, changes: DocumentChanges) -> Result<UpdateOutcome, UseCaseError> {
        if changes.is_empty() {
            return Err(UseCaseError::ValidationError("No changes provided".to_string()));
        }

        let mut document = self.get(id).await?;
        let became_financial = document
            .apply_changes(&changes)
            .map_err(UseCaseError::ValidationError)?;

        self.document_repository
            .update_with_chunk_metadata(&document, &changes.chunk_metadata_patch())
            .await?;

        // Status is read after the write: a worker finishing in between
        // either saw the new kind or left `processed` for this check.
        let document = self.get(id).await?;
        let analysis_queued = became_financial && document.status() == DocumentStatus::Processed;
        if analysis_queued {
            self.job_queue
                .enqueue(DocumentJob::AnalyzeFinancial(id))
                .await?;
            tracing::info!("Document {} became {}, queued transaction extraction", id, document.kind());
        }

        Ok(UpdateOutcome {
            document,
            analysis_queued,
        })
    }

    pub async fn search_text(&self, processo_id: Uuid, query: &str) -> Result<Vec<TextSearchHit>, UseCaseError> {
        if query.trim().is_empty() {
            return Err(UseCaseError::ValidationError("Query cannot be empty".to_string()));
        }

        let documents = self
            .document_repository
            .search_text(processo_id, query, TEXT_SEARCH_LIMIT)
            .await?;

        Ok(documents
            .iter()
            .map(|d| TextSearchHit {
                document_id: d.id(),
                title: d.title().to_string(),
                kind: d.kind().to_string(),
                excerpt: excerpt(d.extracted_text().unwrap_or_default(), query),
            })
            .collect())
    }
}

/// Text around the first case-insensitive match of `query`, or the start of
/// the text when there is none. Works on characters, not bytes.
pub fn excerpt(text: &str, query: &str) -> String {
    let haystack: Vec<char> = text.chars().collect();
    let needle: Vec<char> = query.chars().map(fold_case).collect();

    let position = if needle.is_empty() || needle.len() > haystack.len() {
        None
    } else {
        (0..=haystack.len() - needle.len()).find(|&start| {
            haystack[start..start + needle.len()]
                .iter()
                .zip(&needle)
                .all(|(h, n)| fold_case(*h) == *n)
        })
    };

    match position {
        Some(pos) => {
            let start = pos.saturating_sub(EXCERPT_RADIUS);
            let end = (pos + needle.len() + EXCERPT_RADIUS).min(haystack.len());
            format!("...{}...", haystack[start..end].iter().collect::<String>())
        }
        None => format!(
            "{}...",
            haystack.iter().take(FALLBACK_EXCERPT_CHARS).collect::<String>()
        ),
    }
}

fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

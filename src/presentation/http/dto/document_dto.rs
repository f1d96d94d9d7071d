use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::use_cases::{IngestDocumentRequest, TextSearchHit, UpdateOutcome};
use crate::domain::entities::{Document, DocumentChanges};
use crate::domain::value_objects::DocumentStatus;

#[derive(Debug, Deserialize)]
pub struct CreateDocumentDto {
    pub processo_id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub description: Option<String>,
    pub participants: Option<Vec<String>>,
    pub reference_date: Option<NaiveDate>,
    /// Already extracted plain text.
    pub text: String,
}

impl From<CreateDocumentDto> for IngestDocumentRequest {
    fn from(dto: CreateDocumentDto) -> Self {
        Self {
            processo_id: dto.processo_id,
            user_id: dto.user_id,
            kind: dto.kind,
            title: dto.title,
            description: dto.description,
            participants: dto.participants,
            reference_date: dto.reference_date,
            text: dto.text,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateDocumentDto {
    pub title: Option<String>,
    pub kind: Option<String>,
    pub reference_date: Option<NaiveDate>,
}

impl From<UpdateDocumentDto> for DocumentChanges {
    fn from(dto: UpdateDocumentDto) -> Self {
        Self {
            title: dto.title,
            kind: dto.kind,
            reference_date: dto.reference_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DocumentListQuery {
    pub processo_id: Option<Uuid>,
    pub kind: Option<String>,
    pub status: Option<DocumentStatus>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default)]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct DocumentSearchQuery {
    pub processo_id: Uuid,
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponseDto {
    pub id: Uuid,
    pub processo_id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub description: Option<String>,
    pub participants: Vec<String>,
    pub reference_date: Option<NaiveDate>,
    pub content_hash: Option<String>,
    pub status: DocumentStatus,
    pub error_message: Option<String>,
    pub text_length: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Document> for DocumentResponseDto {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id(),
            processo_id: document.processo_id(),
            user_id: document.user_id(),
            kind: document.kind().to_string(),
            title: document.title().to_string(),
            description: document.description().map(str::to_string),
            participants: document.participants().map(|p| p.to_vec()).unwrap_or_default(),
            reference_date: document.reference_date(),
            content_hash: document.content_hash().map(|h| h.as_str().to_string()),
            status: document.status(),
            error_message: document.error_message().map(str::to_string),
            text_length: document.extracted_text().map_or(0, |t| t.chars().count()),
            created_at: document.created_at(),
            updated_at: document.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponseDto {
    pub documents: Vec<DocumentResponseDto>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct UpdateDocumentResponseDto {
    pub document: DocumentResponseDto,
    pub analysis_queued: bool,
}

impl From<UpdateOutcome> for UpdateDocumentResponseDto {
    fn from(outcome: UpdateOutcome) -> Self {
        Self {
            document: DocumentResponseDto::from(&outcome.document),
            analysis_queued: outcome.analysis_queued,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentSearchResultDto {
    pub document_id: Uuid,
    pub title: String,
    pub kind: String,
    pub excerpt: String,
}

impl From<TextSearchHit> for DocumentSearchResultDto {
    fn from(hit: TextSearchHit) -> Self {
        Self {
            document_id: hit.document_id,
            title: hit.title,
            kind: hit.kind,
            excerpt: hit.excerpt,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentSearchResponseDto {
    pub query: String,
    pub results: Vec<DocumentSearchResultDto>,
    pub total: usize,
}

/// Payload of each `status` event on the document events stream.
#[derive(Debug, Serialize)]
pub struct DocumentStatusDto {
    pub document_id: Uuid,
    pub status: DocumentStatus,
    pub error_message: Option<String>,
    pub is_terminal: bool,
}

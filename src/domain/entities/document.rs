use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{ContentHash, DocumentStatus};

/// Document kinds whose chunks are mined for financial transactions.
pub const FINANCIAL_KINDS: [&str; 2] = ["extrato_bancario", "comprovante"];

pub fn is_financial_kind(kind: &str) -> bool {
    FINANCIAL_KINDS.contains(&kind)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: Uuid,
    processo_id: Uuid,
    user_id: Uuid,
    kind: String,
    title: String,
    description: Option<String>,
    participants: Option<Vec<String>>,
    reference_date: Option<NaiveDate>,
    extracted_text: Option<String>,
    content_hash: Option<ContentHash>,
    status: DocumentStatus,
    error_message: Option<String>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Fields a caller may change after ingestion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentChanges {
    pub title: Option<String>,
    pub kind: Option<String>,
    pub reference_date: Option<NaiveDate>,
}

impl DocumentChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.kind.is_none() && self.reference_date.is_none()
    }

    /// The keys mirrored into every chunk's metadata.
    pub fn chunk_metadata_patch(&self) -> serde_json::Value {
        let mut patch = serde_json::Map::new();
        if let Some(title) = &self.title {
            patch.insert("doc_title".to_string(), serde_json::json!(title));
        }
        if let Some(kind) = &self.kind {
            patch.insert("doc_kind".to_string(), serde_json::json!(kind));
        }
        if let Some(date) = &self.reference_date {
            patch.insert("reference_date".to_string(), serde_json::json!(date.to_string()));
        }
        serde_json::Value::Object(patch)
    }
}

impl Document {
    pub fn new(
        processo_id: Uuid,
        user_id: Uuid,
        kind: String,
        title: String,
        description: Option<String>,
        participants: Option<Vec<String>>,
        reference_date: Option<NaiveDate>,
        extracted_text: String,
    ) -> Result<Self, String> {
        validate_kind(&kind)?;
        if title.trim().is_empty() {
            return Err("Title cannot be empty".to_string());
        }

        let participants = participants
            .map(|list| {
                list.into_iter()
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty());

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            processo_id,
            user_id,
            kind,
            title: title.trim().to_string(),
            description,
            participants,
            reference_date,
            content_hash: Some(ContentHash::of_text(&extracted_text)),
            extracted_text: Some(extracted_text),
            status: DocumentStatus::Uploaded,
            error_message: None,
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a document from stored values.
    pub fn from_database(
        id: Uuid,
        processo_id: Uuid,
        user_id: Uuid,
        kind: String,
        title: String,
        description: Option<String>,
        participants: Option<Vec<String>>,
        reference_date: Option<NaiveDate>,
        extracted_text: Option<String>,
        content_hash: Option<ContentHash>,
        status: DocumentStatus,
        error_message: Option<String>,
        metadata: serde_json::Value,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            processo_id,
            user_id,
            kind,
            title,
            description,
            participants,
            reference_date,
            extracted_text,
            content_hash,
            status,
            error_message,
            metadata,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn processo_id(&self) -> Uuid {
        self.processo_id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn participants(&self) -> Option<&[String]> {
        self.participants.as_deref()
    }

    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.reference_date
    }

    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.as_deref()
    }

    pub fn content_hash(&self) -> Option<&ContentHash> {
        self.content_hash.as_ref()
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_financial(&self) -> bool {
        is_financial_kind(&self.kind)
    }

    pub fn start_processing(&mut self) -> Result<(), String> {
        self.transition(DocumentStatus::Processing)?;
        self.error_message = None;
        Ok(())
    }

    pub fn mark_processed(&mut self) -> Result<(), String> {
        self.transition(DocumentStatus::Processed)
    }

    pub fn mark_failed(&mut self, error: String) -> Result<(), String> {
        self.transition(DocumentStatus::Error)?;
        self.error_message = Some(error);
        Ok(())
    }

    /// Applies the non-empty changes and reports whether the kind moved
    /// into a financial kind.
    pub fn apply_changes(&mut self, changes: &DocumentChanges) -> Result<bool, String> {
        let was_financial = self.is_financial();

        if let Some(kind) = &changes.kind {
            validate_kind(kind)?;
            self.kind = kind.clone();
        }
        if let Some(title) = &changes.title {
            if title.trim().is_empty() {
                return Err("Title cannot be empty".to_string());
            }
            self.title = title.trim().to_string();
        }
        if let Some(date) = changes.reference_date {
            self.reference_date = Some(date);
        }
        self.updated_at = Utc::now();

        Ok(!was_financial && self.is_financial())
    }

    fn transition(&mut self, new_status: DocumentStatus) -> Result<(), String> {
        if !self.status.can_transition_to(new_status) {
            return Err(format!(
                "Cannot move document {} from {} to {}",
                self.id, self.status, new_status
            ));
        }
        self.status = new_status;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn validate_kind(kind: &str) -> Result<(), String> {
    if kind.trim().is_empty() {
        return Err("Document kind cannot be empty".to_string());
    }
    if kind.chars().count() > 30 {
        return Err("Document kind cannot exceed 30 characters".to_string());
    }
    Ok(())
}

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Document;
use crate::domain::repositories::RepositoryError;
use crate::domain::value_objects::{ContentHash, DocumentStatus};
use crate::infrastructure::database::schema::documents;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(belongs_to(super::ProcessoModel, foreign_key = processo_id))]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentModel {
    pub id: Uuid,
    pub processo_id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub description: Option<String>,
    pub participants: Option<Vec<String>>,
    pub reference_date: Option<NaiveDate>,
    pub extracted_text: Option<String>,
    pub content_hash: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentModel {
    pub id: Uuid,
    pub processo_id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub description: Option<String>,
    pub participants: Option<Vec<String>>,
    pub reference_date: Option<NaiveDate>,
    pub extracted_text: Option<String>,
    pub content_hash: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Document> for NewDocumentModel {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id(),
            processo_id: document.processo_id(),
            user_id: document.user_id(),
            kind: document.kind().to_string(),
            title: document.title().to_string(),
            description: document.description().map(str::to_string),
            participants: document.participants().map(|p| p.to_vec()),
            reference_date: document.reference_date(),
            extracted_text: document.extracted_text().map(str::to_string),
            content_hash: document.content_hash().map(|h| h.as_str().to_string()),
            status: document.status().as_str().to_string(),
            error_message: document.error_message().map(str::to_string),
            metadata: document.metadata().clone(),
            created_at: document.created_at(),
            updated_at: document.updated_at(),
        }
    }
}

impl TryFrom<DocumentModel> for Document {
    type Error = RepositoryError;

    fn try_from(model: DocumentModel) -> Result<Self, Self::Error> {
        let status =
            DocumentStatus::from_string(&model.status).map_err(RepositoryError::ValidationError)?;
        let content_hash = model
            .content_hash
            .map(ContentHash::new)
            .transpose()
            .map_err(RepositoryError::ValidationError)?;

        Ok(Document::from_database(
            model.id,
            model.processo_id,
            model.user_id,
            model.kind,
            model.title,
            model.description,
            model.participants,
            model.reference_date,
            model.extracted_text,
            content_hash,
            status,
            model.error_message,
            model.metadata,
            model.created_at,
            model.updated_at,
        ))
    }
}

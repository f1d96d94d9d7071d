use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Document;
use crate::domain::repositories::{DocumentFilter, DocumentRepository, RepositoryError};
use crate::domain::value_objects::{ContentHash, DocumentStatus};
use crate::infrastructure::database::models::{DocumentModel, NewDocumentModel};
use crate::infrastructure::database::schema::{chunks, documents};
use crate::infrastructure::database::{DbPool, with_connection};

pub struct PostgresDocumentRepository {
    pool: DbPool,
}

impl PostgresDocumentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_documents(models: Vec<DocumentModel>) -> Result<Vec<Document>, RepositoryError> {
    models.into_iter().map(Document::try_from).collect()
}

/// Escapes LIKE wildcards so user input matches literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn save(&self, document: &Document) -> Result<(), RepositoryError> {
        let model = NewDocumentModel::from(document);

        with_connection(&self.pool, move |conn| {
            diesel::insert_into(documents::table)
                .values(&model)
                .execute(conn)
                .map(|_| ())
        })
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, RepositoryError> {
        let model = with_connection(&self.pool, move |conn| {
            documents::table
                .find(id)
                .select(DocumentModel::as_select())
                .first(conn)
                .optional()
        })
        .await?;

        model.map(Document::try_from).transpose()
    }

    async fn find_by_hash(
        &self,
        processo_id: Uuid,
        hash: &ContentHash,
    ) -> Result<Option<Document>, RepositoryError> {
        let hash = hash.as_str().to_string();

        let model = with_connection(&self.pool, move |conn| {
            documents::table
                .filter(documents::processo_id.eq(processo_id))
                .filter(documents::content_hash.eq(hash))
                .select(DocumentModel::as_select())
                .first(conn)
                .optional()
        })
        .await?;

        model.map(Document::try_from).transpose()
    }

    async fn list(&self, filter: &DocumentFilter) -> Result<Vec<Document>, RepositoryError> {
        let filter = filter.clone();

        let models = with_connection(&self.pool, move |conn| {
            let mut query = documents::table
                .select(DocumentModel::as_select())
                .order(documents::created_at.desc())
                .offset(filter.skip)
                .limit(filter.limit)
                .into_boxed();
            if let Some(processo_id) = filter.processo_id {
                query = query.filter(documents::processo_id.eq(processo_id));
            }
            if let Some(kind) = filter.kind {
                query = query.filter(documents::kind.eq(kind));
            }
            if let Some(status) = filter.status {
                query = query.filter(documents::status.eq(status.as_str()));
            }
            query.load(conn)
        })
        .await?;

        into_documents(models)
    }

    async fn search_text(
        &self,
        processo_id: Uuid,
        query: &str,
        limit: i64,
    ) -> Result<Vec<Document>, RepositoryError> {
        let pattern = like_pattern(query);

        let models = with_connection(&self.pool, move |conn| {
            documents::table
                .filter(documents::processo_id.eq(processo_id))
                .filter(documents::extracted_text.ilike(pattern))
                .select(DocumentModel::as_select())
                .order(documents::created_at.desc())
                .limit(limit)
                .load(conn)
        })
        .await?;

        into_documents(models)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
        error_message: Option<String>,
    ) -> Result<(), RepositoryError> {
        let updated = with_connection(&self.pool, move |conn| {
            diesel::update(documents::table.find(id))
                .set((
                    documents::status.eq(status.as_str()),
                    documents::error_message.eq(error_message),
                    documents::updated_at.eq(Utc::now()),
                ))
                .execute(conn)
        })
        .await?;

        if updated == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    async fn update_with_chunk_metadata(
        &self,
        document: &Document,
        chunk_patch: &serde_json::Value,
    ) -> Result<(), RepositoryError> {
        let id = document.id();
        let kind = document.kind().to_string();
        let title = document.title().to_string();
        let reference_date = document.reference_date();
        let patch = chunk_patch.clone();

        let updated = with_connection(&self.pool, move |conn| {
            conn.transaction(|conn| {
                let updated = diesel::update(documents::table.find(id))
                    .set((
                        documents::kind.eq(kind),
                        documents::title.eq(title),
                        documents::reference_date.eq(reference_date),
                        documents::updated_at.eq(Utc::now()),
                    ))
                    .execute(conn)?;
                diesel::update(chunks::table.filter(chunks::document_id.eq(id)))
                    .set(chunks::metadata.eq(chunks::metadata.concat(patch)))
                    .execute(conn)?;
                Ok(updated)
            })
        })
        .await?;

        if updated == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let deleted = with_connection(&self.pool, move |conn| {
            diesel::delete(documents::table.find(id)).execute(conn)
        })
        .await?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("pensao"), "%pensao%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::use_cases::{IngestDocumentUseCase, ManageDocumentsUseCase};
use crate::domain::repositories::DocumentFilter;
use crate::presentation::http::dto::{
    CreateDocumentDto, DocumentListQuery, DocumentListResponseDto, DocumentResponseDto,
    DocumentSearchQuery, DocumentSearchResponseDto, DocumentSearchResultDto, MessageResponseDto,
    UpdateDocumentDto, UpdateDocumentResponseDto, error_response, success_response,
};

pub struct DocumentHandler {
    ingest_use_case: Arc<IngestDocumentUseCase>,
    documents_use_case: Arc<ManageDocumentsUseCase>,
}

impl DocumentHandler {
    pub fn new(
        ingest_use_case: Arc<IngestDocumentUseCase>,
        documents_use_case: Arc<ManageDocumentsUseCase>,
    ) -> Self {
        Self {
            ingest_use_case,
            documents_use_case,
        }
    }

    pub async fn create_document(
        State(handler): State<Arc<DocumentHandler>>,
        Json(payload): Json<CreateDocumentDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.ingest_use_case.execute(payload.into()).await {
            Ok(document) => Ok(success_response(
                StatusCode::CREATED,
                DocumentResponseDto::from(&document),
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn list_documents(
        State(handler): State<Arc<DocumentHandler>>,
        Query(query): Query<DocumentListQuery>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let filter = DocumentFilter {
            processo_id: query.processo_id,
            kind: query.kind,
            status: query.status,
            skip: query.skip,
            limit: query.limit,
        };

        match handler.documents_use_case.list(filter).await {
            Ok(documents) => {
                let documents: Vec<DocumentResponseDto> =
                    documents.iter().map(DocumentResponseDto::from).collect();
                Ok(success_response(
                    StatusCode::OK,
                    DocumentListResponseDto {
                        total: documents.len(),
                        documents,
                    },
                ))
            }
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn get_document(
        State(handler): State<Arc<DocumentHandler>>,
        Path(document_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.documents_use_case.get(document_id).await {
            Ok(document) => Ok(success_response(
                StatusCode::OK,
                DocumentResponseDto::from(&document),
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn update_document(
        State(handler): State<Arc<DocumentHandler>>,
        Path(document_id): Path<Uuid>,
        Json(payload): Json<UpdateDocumentDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler
            .documents_use_case
            .update(document_id, payload.into())
            .await
        {
            Ok(outcome) => Ok(success_response(
                StatusCode::OK,
                UpdateDocumentResponseDto::from(outcome),
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn delete_document(
        State(handler): State<Arc<DocumentHandler>>,
        Path(document_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.documents_use_case.delete(document_id).await {
            Ok(()) => Ok(success_response(
                StatusCode::OK,
                MessageResponseDto {
                    message: format!("Document {} deleted", document_id),
                },
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn reprocess_document(
        State(handler): State<Arc<DocumentHandler>>,
        Path(document_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.documents_use_case.reprocess(document_id).await {
            Ok(_) => Ok(success_response(
                StatusCode::ACCEPTED,
                MessageResponseDto {
                    message: format!("Document {} queued for processing", document_id),
                },
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn search_documents(
        State(handler): State<Arc<DocumentHandler>>,
        Query(query): Query<DocumentSearchQuery>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler
            .documents_use_case
            .search_text(query.processo_id, &query.q)
            .await
        {
            Ok(hits) => {
                let results: Vec<DocumentSearchResultDto> =
                    hits.into_iter().map(DocumentSearchResultDto::from).collect();
                Ok(success_response(
                    StatusCode::OK,
                    DocumentSearchResponseDto {
                        query: query.q,
                        total: results.len(),
                        results,
                    },
                ))
            }
            Err(e) => Ok(error_response(&e)),
        }
    }
}

use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::{EmbeddingProvider, TextChunker};
use crate::domain::entities::{Chunk, ChunkMetadata, Document};
use crate::domain::repositories::{ChunkRepository, DocumentRepository};
use crate::domain::value_objects::DocumentStatus;

#[derive(Debug)]
pub enum DocumentProcessingError {
    NotFound(Uuid),
    InvalidState(String),
    EmbeddingError(String),
    RepositoryError(String),
}

impl std::fmt::Display for DocumentProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentProcessingError::NotFound(id) => write!(f, "Document not found: {}", id),
            DocumentProcessingError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            DocumentProcessingError::EmbeddingError(msg) => write!(f, "Embedding error: {}", msg),
            DocumentProcessingError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for DocumentProcessingError {}

#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    pub document: Document,
    pub chunk_count: usize,
}

pub struct DocumentProcessorService {
    document_repository: Arc<dyn DocumentRepository>,
    chunk_repository: Arc<dyn ChunkRepository>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn TextChunker>,
}

impl DocumentProcessorService {
    pub fn new(
        document_repository: Arc<dyn DocumentRepository>,
        chunk_repository: Arc<dyn ChunkRepository>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        chunker: Arc<dyn TextChunker>,
    ) -> Self {
        Self {
            document_repository,
            chunk_repository,
            embedding_provider,
            chunker,
        }
    }

    /// Runs the full pipeline for one document. Failures after the document
    /// entered `processing` are recorded on it as `error`. The returned
    /// document is read back after the final status write.
    pub async fn process(&self, document_id: Uuid) -> Result<ProcessingOutcome, DocumentProcessingError> {
        let mut document = self.load(document_id).await?;

        document
            .start_processing()
            .map_err(DocumentProcessingError::InvalidState)?;
        self.write_status(document_id, DocumentStatus::Processing, None)
            .await?;

        match self.chunk_and_embed(&document).await {
            Ok(chunk_count) => {
                document
                    .mark_processed()
                    .map_err(DocumentProcessingError::InvalidState)?;
                self.write_status(document_id, DocumentStatus::Processed, None)
                    .await?;
                Ok(ProcessingOutcome {
                    document: self.load(document_id).await?,
                    chunk_count,
                })
            }
            Err(e) => {
                if let Err(state) = document.mark_failed(e.to_string()) {
                    tracing::error!("Could not mark document {} as failed: {}", document_id, state);
                } else if let Err(save) = self
                    .write_status(document_id, DocumentStatus::Error, Some(e.to_string()))
                    .await
                {
                    tracing::error!("Could not persist failure of document {}: {}", document_id, save);
                }
                Err(e)
            }
        }
    }

    async fn chunk_and_embed(&self, document: &Document) -> Result<usize, DocumentProcessingError> {
        let text = document.extracted_text().unwrap_or_default();
        let pieces = self.chunker.chunk_text(text);

        if pieces.is_empty() {
            self.chunk_repository
                .replace_for_document(document.id(), &[])
                .await
                .map_err(|e| DocumentProcessingError::RepositoryError(e.to_string()))?;
            return Ok(0);
        }

        let texts: Vec<String> = pieces.iter().map(|p| p.content.clone()).collect();
        let vectors = self
            .embedding_provider
            .embed(&texts)
            .await
            .map_err(|e| DocumentProcessingError::EmbeddingError(e.to_string()))?;

        if vectors.len() != pieces.len() {
            return Err(DocumentProcessingError::EmbeddingError(format!(
                "Expected {} embeddings, got {}",
                pieces.len(),
                vectors.len()
            )));
        }

        // Title, kind or date may have been edited while embedding ran.
        let current = self.load(document.id()).await?;
        let metadata = ChunkMetadata::from_document(&current).to_json();
        let dimension = self.embedding_provider.dimension();
        let mut chunks = Vec::with_capacity(pieces.len());

        for (position, (piece, vector)) in pieces.into_iter().zip(vectors).enumerate() {
            let mut chunk = Chunk::new(
                document.id(),
                piece.content,
                position as i32,
                Some(piece.token_count as i32),
                metadata.clone(),
            );
            chunk
                .set_embedding(vector, dimension)
                .map_err(DocumentProcessingError::EmbeddingError)?;
            chunks.push(chunk);
        }

        self.chunk_repository
            .replace_for_document(document.id(), &chunks)
            .await
            .map_err(|e| DocumentProcessingError::RepositoryError(e.to_string()))?;

        Ok(chunks.len())
    }

    async fn load(&self, document_id: Uuid) -> Result<Document, DocumentProcessingError> {
        self.document_repository
            .find_by_id(document_id)
            .await
            .map_err(|e| DocumentProcessingError::RepositoryError(e.to_string()))?
            .ok_or(DocumentProcessingError::NotFound(document_id))
    }

    async fn write_status(
        &self,
        document_id: Uuid,
        status: DocumentStatus,
        error_message: Option<String>,
    ) -> Result<(), DocumentProcessingError> {
        self.document_repository
            .update_status(document_id, status, error_message)
            .await
            .map_err(|e| DocumentProcessingError::RepositoryError(e.to_string()))
    }
}

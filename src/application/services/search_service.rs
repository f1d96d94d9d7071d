use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::EmbeddingProvider;
use crate::domain::entities::RetrievedChunk;
use crate::domain::repositories::{ChunkRepository, SimilarityQuery};

pub const NO_CONTEXT_MESSAGE: &str = "Nenhum documento relevante encontrado.";

#[derive(Debug)]
pub enum SearchServiceError {
    EmbeddingError(String),
    RepositoryError(String),
}

impl std::fmt::Display for SearchServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchServiceError::EmbeddingError(msg) => write!(f, "Embedding error: {}", msg),
            SearchServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for SearchServiceError {}

pub struct SearchService {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunk_repository: Arc<dyn ChunkRepository>,
    default_top_k: usize,
    similarity_threshold: f32,
}

impl SearchService {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        chunk_repository: Arc<dyn ChunkRepository>,
        default_top_k: usize,
        similarity_threshold: f32,
    ) -> Self {
        Self {
            embedding_provider,
            chunk_repository,
            default_top_k,
            similarity_threshold,
        }
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    /// Chunks of processed documents closest to `query`, most similar first.
    pub async fn search_similar_chunks(
        &self,
        query: &str,
        processo_id: Option<Uuid>,
        top_k: Option<usize>,
    ) -> Result<Vec<RetrievedChunk>, SearchServiceError> {
        let mut vectors = self
            .embedding_provider
            .embed(&[query.to_string()])
            .await
            .map_err(|e| SearchServiceError::EmbeddingError(e.to_string()))?;

        let vector = vectors.pop().ok_or_else(|| {
            SearchServiceError::EmbeddingError("No embedding returned for query".to_string())
        })?;

        let similarity_query = SimilarityQuery {
            vector,
            processo_id,
            limit: top_k.unwrap_or(self.default_top_k) as i64,
            threshold: Some(self.similarity_threshold),
        };

        let results = self
            .chunk_repository
            .similarity_search(&similarity_query)
            .await
            .map_err(|e| SearchServiceError::RepositoryError(e.to_string()))?;

        tracing::debug!(
            "Retrieved {} chunks for query (processo {:?})",
            results.len(),
            processo_id
        );
        Ok(results)
    }
}

/// Renders retrieved chunks as numbered source blocks for the prompt.
pub fn build_context(chunks: &[RetrievedChunk]) -> String {
    if chunks.is_empty() {
        return NO_CONTEXT_MESSAGE.to_string();
    }

    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut source = format!("[{}] {}", chunk.doc_kind, chunk.doc_title);
            if let Some(date) = chunk.reference_date {
                source.push_str(&format!(" ({})", date));
            }
            if !chunk.participants.is_empty() {
                source.push_str(&format!(" - Participantes: {}", chunk.participants.join(", ")));
            }
            format!(
                "--- Fonte {} (relevancia: {:.2}): {} ---\n{}\n",
                i + 1,
                chunk.similarity,
                source,
                chunk.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use pgvector::Vector;
    use std::sync::Mutex;
    use uuid::Uuid;

    use crate::application::ports::{EmbeddingProvider, EmbeddingProviderError};
    use crate::domain::entities::{Chunk, RetrievedChunk};
    use crate::domain::repositories::{ChunkRepository, RepositoryError, SimilarityQuery};

    pub fn retrieved(title: &str, similarity: f32) -> RetrievedChunk {
        RetrievedChunk {
            chunk_id: Uuid::new_v4(),
            content: format!("conteudo de {}", title),
            position: 0,
            document_id: Uuid::new_v4(),
            doc_title: title.to_string(),
            doc_kind: "whatsapp".to_string(),
            participants: Vec::new(),
            reference_date: None,
            similarity,
        }
    }

    pub struct FakeEmbeddings {
        pub dimension: usize,
        pub fail: bool,
    }

    #[async_trait]
    impl EmbeddingProvider for FakeEmbeddings {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>, EmbeddingProviderError> {
            if self.fail {
                return Err(EmbeddingProviderError::ServiceUnavailable);
            }
            Ok(texts
                .iter()
                .map(|t| Vector::from(vec![t.len() as f32; self.dimension]))
                .collect())
        }

        fn model_name(&self) -> &str {
            "fake-embedding"
        }

        fn dimension(&self) -> usize {
            self.dimension
        }
    }

    #[derive(Default)]
    pub struct FakeChunks {
        pub hits: Vec<RetrievedChunk>,
        pub stored: Mutex<Vec<Chunk>>,
        pub last_query: Mutex<Option<SimilarityQuery>>,
    }

    #[async_trait]
    impl ChunkRepository for FakeChunks {
        async fn replace_for_document(
            &self,
            document_id: Uuid,
            chunks: &[Chunk],
        ) -> Result<(), RepositoryError> {
            let mut stored = self.stored.lock().unwrap();
            stored.retain(|c| c.document_id() != document_id);
            stored.extend_from_slice(chunks);
            Ok(())
        }

        async fn find_by_document(&self, document_id: Uuid) -> Result<Vec<Chunk>, RepositoryError> {
            Ok(self
                .stored
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.document_id() == document_id)
                .cloned()
                .collect())
        }

        async fn count_by_document(&self, document_id: Uuid) -> Result<i64, RepositoryError> {
            Ok(self.find_by_document(document_id).await?.len() as i64)
        }

        async fn similarity_search(
            &self,
            query: &SimilarityQuery,
        ) -> Result<Vec<RetrievedChunk>, RepositoryError> {
            *self.last_query.lock().unwrap() = Some(query.clone());
            let threshold = query.threshold.unwrap_or(f32::MIN);
            Ok(self
                .hits
                .iter()
                .filter(|h| h.similarity >= threshold)
                .take(query.limit as usize)
                .cloned()
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_build_context_empty() {
        assert_eq!(build_context(&[]), NO_CONTEXT_MESSAGE);
    }

    #[test]
    fn test_build_context_format() {
        let mut first = retrieved("Conversa escola", 0.873);
        first.reference_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        first.participants = vec!["Ana".to_string(), "Pedro".to_string()];
        let second = retrieved("Extrato marco", 0.5);

        let context = build_context(&[first, second]);

        assert_eq!(
            context,
            "--- Fonte 1 (relevancia: 0.87): [whatsapp] Conversa escola (2024-03-01) - Participantes: Ana, Pedro ---\n\
             conteudo de Conversa escola\n\
             \n\
             --- Fonte 2 (relevancia: 0.50): [whatsapp] Extrato marco ---\n\
             conteudo de Extrato marco\n"
        );
    }

    #[tokio::test]
    async fn test_search_applies_threshold_and_top_k() {
        let chunks = Arc::new(FakeChunks {
            hits: vec![retrieved("a", 0.9), retrieved("b", 0.6), retrieved("c", 0.2)],
            ..Default::default()
        });
        let service = SearchService::new(
            Arc::new(FakeEmbeddings { dimension: 4, fail: false }),
            chunks.clone(),
            5,
            0.3,
        );

        let processo = Uuid::new_v4();
        let results = service
            .search_similar_chunks("quem pagou a escola?", Some(processo), None)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);

        let query = chunks.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(query.processo_id, Some(processo));
        assert_eq!(query.limit, 5);

        let top_one = service.search_similar_chunks("escola", None, Some(1)).await.unwrap();
        assert_eq!(top_one.len(), 1);
        assert_eq!(top_one[0].doc_title, "a");
    }

    #[tokio::test]
    async fn test_search_embedding_failure() {
        let service = SearchService::new(
            Arc::new(FakeEmbeddings { dimension: 4, fail: true }),
            Arc::new(FakeChunks::default()),
            5,
            0.3,
        );

        let result = service.search_similar_chunks("escola", None, None).await;
        assert!(matches!(result, Err(SearchServiceError::EmbeddingError(_))));
    }
}

use std::sync::Arc;
use uuid::Uuid;

use super::UseCaseError;
use crate::application::services::SearchService;
use crate::application::services::search_service::SearchServiceError;
use crate::domain::entities::RetrievedChunk;

const MAX_TOP_K: usize = 50;

#[derive(Debug, Clone)]
pub struct SearchContentRequest {
    pub query: String,
    pub processo_id: Option<Uuid>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SearchContentResponse {
    pub query: String,
    pub results: Vec<RetrievedChunk>,
    pub search_time_ms: u64,
}

pub struct SearchContentUseCase {
    search_service: Arc<SearchService>,
}

impl SearchContentUseCase {
    pub fn new(search_service: Arc<SearchService>) -> Self {
        Self { search_service }
    }

    pub async fn execute(&self, request: SearchContentRequest) -> Result<SearchContentResponse, UseCaseError> {
        let start_time = std::time::Instant::now();

        if request.query.trim().is_empty() {
            return Err(UseCaseError::ValidationError("Query cannot be empty".to_string()));
        }

        let top_k = request.top_k.unwrap_or(self.search_service.default_top_k());
        if top_k == 0 || top_k > MAX_TOP_K {
            return Err(UseCaseError::ValidationError(format!(
                "top_k must be between 1 and {}",
                MAX_TOP_K
            )));
        }

        let results = self
            .search_service
            .search_similar_chunks(&request.query, request.processo_id, Some(top_k))
            .await
            .map_err(|e| match e {
                SearchServiceError::EmbeddingError(msg) => UseCaseError::UpstreamError(msg),
                SearchServiceError::RepositoryError(msg) => UseCaseError::RepositoryError(msg),
            })?;

        Ok(SearchContentResponse {
            query: request.query,
            results,
            search_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

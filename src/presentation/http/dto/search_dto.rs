use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::use_cases::SearchContentResponse;
use crate::domain::entities::RetrievedChunk;

#[derive(Debug, Deserialize)]
pub struct SearchRequestDto {
    pub q: String,
    pub processo_id: Option<Uuid>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponseDto {
    pub query: String,
    pub results: Vec<SearchResultDto>,
    pub total_results: usize,
    pub search_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct SearchResultDto {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub content: String,
    pub position: i32,
    pub doc_title: String,
    pub doc_kind: String,
    pub participants: Vec<String>,
    pub reference_date: Option<NaiveDate>,
    pub similarity: f32,
}

impl From<SearchContentResponse> for SearchResponseDto {
    fn from(response: SearchContentResponse) -> Self {
        Self {
            query: response.query,
            total_results: response.results.len(),
            results: response.results.into_iter().map(SearchResultDto::from).collect(),
            search_time_ms: response.search_time_ms,
        }
    }
}

impl From<RetrievedChunk> for SearchResultDto {
    fn from(chunk: RetrievedChunk) -> Self {
        Self {
            chunk_id: chunk.chunk_id,
            document_id: chunk.document_id,
            content: chunk.content,
            position: chunk.position,
            doc_title: chunk.doc_title,
            doc_kind: chunk.doc_kind,
            participants: chunk.participants,
            reference_date: chunk.reference_date,
            similarity: chunk.similarity,
        }
    }
}

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::use_cases::{SearchContentRequest, SearchContentUseCase};
use crate::presentation::http::dto::{
    SearchRequestDto, SearchResponseDto, error_response, success_response,
};

pub struct SearchHandler {
    search_use_case: Arc<SearchContentUseCase>,
}

impl SearchHandler {
    pub fn new(search_use_case: Arc<SearchContentUseCase>) -> Self {
        Self { search_use_case }
    }

    pub async fn search_content(
        State(handler): State<Arc<SearchHandler>>,
        Query(search_params): Query<SearchRequestDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let request = SearchContentRequest {
            query: search_params.q,
            processo_id: search_params.processo_id,
            top_k: search_params.top_k,
        };

        match handler.search_use_case.execute(request).await {
            Ok(response) => Ok(success_response(
                StatusCode::OK,
                SearchResponseDto::from(response),
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }
}

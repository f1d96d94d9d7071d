use axum::{Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use std::sync::Arc;

use crate::infrastructure::messaging::MpscJobQueue;
use crate::presentation::http::dto::{HealthResponseDto, success_response};

pub fn health_routes(job_queue: Arc<MpscJobQueue>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(job_queue)
}

async fn health_handler(State(job_queue): State<Arc<MpscJobQueue>>) -> impl IntoResponse {
    let queue = job_queue.stats().await;
    let health_response = HealthResponseDto {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        queued_jobs: queue.pending(),
        queue,
    };

    success_response(StatusCode::OK, health_response)
}

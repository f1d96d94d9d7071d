use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::use_cases::UseCaseError;
use crate::infrastructure::messaging::QueueStats;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(code: String, message: String, details: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message,
                details,
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Wraps `data` in a successful envelope with the given status.
pub fn success_response<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(ApiResponse::success(data))).into_response()
}

pub fn error_status(error: &UseCaseError) -> (StatusCode, &'static str) {
    match error {
        UseCaseError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        UseCaseError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        UseCaseError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        UseCaseError::UpstreamError(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
        UseCaseError::RepositoryError(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
        }
        UseCaseError::QueueError(_) => (StatusCode::SERVICE_UNAVAILABLE, "QUEUE_ERROR"),
        UseCaseError::ReportError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "REPORT_ERROR"),
    }
}

pub fn error_response(error: &UseCaseError) -> Response {
    let (status, code) = error_status(error);
    if status.is_server_error() {
        tracing::error!("{}", error);
    }
    (
        status,
        Json(ApiResponse::<()>::error(
            code.to_string(),
            error.to_string(),
            None,
        )),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
pub struct HealthResponseDto {
    pub status: String,
    pub version: String,
    pub queued_jobs: usize,
    pub queue: QueueStats,
}

#[derive(Debug, Serialize)]
pub struct MessageResponseDto {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (UseCaseError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (UseCaseError::ValidationError("x".into()), StatusCode::BAD_REQUEST),
            (UseCaseError::Conflict("x".into()), StatusCode::CONFLICT),
            (UseCaseError::UpstreamError("x".into()), StatusCode::BAD_GATEWAY),
            (UseCaseError::RepositoryError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (UseCaseError::QueueError("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (UseCaseError::ReportError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(error_status(&error).0, expected);
        }
    }

    #[test]
    fn test_error_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::<()>::error(
            "CONFLICT".to_string(),
            "Duplicate".to_string(),
            None,
        ))
        .unwrap();

        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
        assert_eq!(body["error"]["code"], "CONFLICT");
        assert!(body["timestamp"].is_string());
    }
}

use uuid::Uuid;

use crate::application::ports::{JobQueueError, ReportRenderError};
use crate::domain::repositories::RepositoryError;

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(String),
    ValidationError(String),
    Conflict(String),
    /// Embedding or chat model failure.
    UpstreamError(String),
    RepositoryError(String),
    QueueError(String),
    ReportError(String),
}

impl UseCaseError {
    pub fn not_found(what: &str, id: Uuid) -> Self {
        UseCaseError::NotFound(format!("{} {} not found", what, id))
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UseCaseError::NotFound(msg) => write!(f, "Not found: {}", msg),
            UseCaseError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            UseCaseError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            UseCaseError::UpstreamError(msg) => write!(f, "Upstream error: {}", msg),
            UseCaseError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
            UseCaseError::QueueError(msg) => write!(f, "Queue error: {}", msg),
            UseCaseError::ReportError(msg) => write!(f, "Report error: {}", msg),
        }
    }
}

impl std::error::Error for UseCaseError {}

impl From<RepositoryError> for UseCaseError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(id) => UseCaseError::NotFound(format!("Record {} not found", id)),
            RepositoryError::ValidationError(msg) => UseCaseError::ValidationError(msg),
            RepositoryError::DuplicateError(msg) => UseCaseError::Conflict(msg),
            RepositoryError::DatabaseError(msg) => UseCaseError::RepositoryError(msg),
        }
    }
}

impl From<ReportRenderError> for UseCaseError {
    fn from(error: ReportRenderError) -> Self {
        UseCaseError::ReportError(error.0)
    }
}

impl From<JobQueueError> for UseCaseError {
    fn from(error: JobQueueError) -> Self {
        UseCaseError::QueueError(error.to_string())
    }
}

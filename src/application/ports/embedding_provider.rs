use async_trait::async_trait;
use pgvector::Vector;

#[derive(Debug)]
pub enum EmbeddingProviderError {
    NetworkError(String),
    ApiError(String),
    InvalidInput(String),
    InvalidResponse(String),
    RateLimitExceeded,
    ServiceUnavailable,
}

impl EmbeddingProviderError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EmbeddingProviderError::NetworkError(_)
                | EmbeddingProviderError::RateLimitExceeded
                | EmbeddingProviderError::ServiceUnavailable
        )
    }
}

impl std::fmt::Display for EmbeddingProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProviderError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            EmbeddingProviderError::ApiError(msg) => write!(f, "API error: {}", msg),
            EmbeddingProviderError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            EmbeddingProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            EmbeddingProviderError::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            EmbeddingProviderError::ServiceUnavailable => write!(f, "Service unavailable"),
        }
    }
}

impl std::error::Error for EmbeddingProviderError {}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// One vector per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>, EmbeddingProviderError>;

    fn model_name(&self) -> &str;

    fn dimension(&self) -> usize;
}

use async_trait::async_trait;
use futures::{StreamExt, future, stream};
use pgvector::Vector;
use reqwest::{Client, Error as ReqwestError, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

use crate::application::ports::chat_model::{
    ChatModel, ChatModelError, ChatRequest, Completion, DeltaStream, StreamDelta, Usage,
};
use crate::application::ports::embedding_provider::{EmbeddingProvider, EmbeddingProviderError};
use crate::config::ModelSettings;

pub const EMBEDDING_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct OpenAiClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub backoff_factor: f64,
    /// First retry delay; later ones grow by `backoff_factor`.
    pub backoff_base_ms: u64,
}

impl OpenAiClientConfig {
    pub fn from_settings(settings: &ModelSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            max_retries: 3,
            timeout_secs: 120,
            backoff_factor: 1.5,
            backoff_base_ms: 1000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    config: OpenAiClientConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiClientConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json")
    }
}

// ---------------------------------------------------------------------------
// Embeddings
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

pub struct OpenAiEmbeddingProvider {
    client: OpenAiClient,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbeddingProvider {
    pub fn new(client: OpenAiClient, model: String, dimensions: usize) -> Self {
        Self {
            client,
            model,
            dimensions,
        }
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vector>, EmbeddingProviderError> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.execute_request(batch).await {
                Ok(vectors) => return Ok(vectors),
                Err(e) if e.is_retryable() && attempts <= self.client.config.max_retries => {
                    let config = &self.client.config;
                    let backoff_time = Duration::from_millis(
                        (config.backoff_factor.powi(attempts as i32 - 1) * config.backoff_base_ms as f64)
                            as u64,
                    );
                    tracing::warn!(
                        "Embedding request failed (attempt {}): {}; retrying in {:?}",
                        attempts,
                        e,
                        backoff_time
                    );
                    tokio::time::sleep(backoff_time).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn execute_request(&self, batch: &[String]) -> Result<Vec<Vector>, EmbeddingProviderError> {
        let request = EmbeddingsRequest {
            model: &self.model,
            input: batch,
            dimensions: self.dimensions,
        };

        let response = self
            .client
            .post("embeddings")
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingProviderError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(EmbeddingProviderError::RateLimitExceeded);
        }
        if status.is_server_error() {
            return Err(EmbeddingProviderError::ServiceUnavailable);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingProviderError::ApiError(format!("{}: {}", status, body)));
        }

        let parsed = response
            .json::<EmbeddingsResponse>()
            .await
            .map_err(|e| EmbeddingProviderError::InvalidResponse(e.to_string()))?;

        collect_vectors(parsed, batch.len(), self.dimensions)
    }
}

fn collect_vectors(
    mut response: EmbeddingsResponse,
    expected_count: usize,
    dimensions: usize,
) -> Result<Vec<Vector>, EmbeddingProviderError> {
    if response.data.len() != expected_count {
        return Err(EmbeddingProviderError::InvalidResponse(format!(
            "Expected {} embeddings, got {}",
            expected_count,
            response.data.len()
        )));
    }

    response.data.sort_by_key(|item| item.index);
    response
        .data
        .into_iter()
        .map(|item| {
            if item.embedding.len() != dimensions {
                return Err(EmbeddingProviderError::InvalidResponse(format!(
                    "Expected {} dimensions, got {}",
                    dimensions,
                    item.embedding.len()
                )));
            }
            Ok(Vector::from(item.embedding))
        })
        .collect()
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>, EmbeddingProviderError> {
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(EmbeddingProviderError::InvalidInput(
                "Cannot embed empty text".to_string(),
            ));
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBEDDING_BATCH_SIZE) {
            vectors.extend(self.embed_batch(batch).await?);
        }

        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimensions
    }
}

// ---------------------------------------------------------------------------
// Chat completions
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<Value>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> ChatCompletionBody<'a> {
    fn from_request(request: &'a ChatRequest, stream: bool) -> Self {
        Self {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: request.temperature,
            max_completion_tokens: request.max_completion_tokens,
            response_format: request
                .json_mode
                .then(|| json!({ "type": "json_object" })),
            stream,
            stream_options: stream.then(|| json!({ "include_usage": true })),
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Value,
}

#[derive(Deserialize)]
struct ChatStreamChunk {
    #[serde(default)]
    choices: Vec<ChatStreamChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatStreamChoice {
    #[serde(default)]
    delta: ChatStreamDelta,
}

#[derive(Deserialize, Default)]
struct ChatStreamDelta {
    #[serde(default)]
    content: Value,
}

/// Message content may be a plain string, a list of typed parts or null.
fn flatten_content(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| match part {
                Value::String(s) => Some(s.as_str()),
                Value::Object(obj) => obj.get("text").and_then(Value::as_str),
                _ => None,
            })
            .collect(),
        _ => String::new(),
    }
}

pub struct OpenAiChatModel {
    client: OpenAiClient,
}

impl OpenAiChatModel {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    async fn send(&self, request: &ChatRequest, stream: bool) -> Result<reqwest::Response, ChatModelError> {
        let body = ChatCompletionBody::from_request(request, stream);

        let response = self
            .client
            .post("chat/completions")
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatModelError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ChatModelError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, request: ChatRequest) -> Result<Completion, ChatModelError> {
        let response = self
            .send(&request, false)
            .await?
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| ChatModelError::InvalidResponse(e.to_string()))?;

        let content = response
            .choices
            .first()
            .map(|choice| flatten_content(&choice.message.content))
            .unwrap_or_default();

        Ok(Completion {
            content,
            usage: response.usage.unwrap_or_default(),
        })
    }

    async fn stream(&self, request: ChatRequest) -> Result<DeltaStream, ChatModelError> {
        let response = self.send(&request, true).await?;

        let deltas = response
            .bytes_stream()
            .scan(SseLineBuffer::default(), |buffer, chunk| {
                let items = match chunk {
                    Ok(bytes) => buffer.push(&bytes),
                    Err(e) => vec![Err(ChatModelError::NetworkError(e.without_url().to_string()))],
                };
                future::ready(Some(items))
            })
            .flat_map(stream::iter);

        Ok(deltas.boxed())
    }
}

/// Accumulates raw stream bytes and turns each complete `data:` line into
/// deltas. Partial lines wait for the next network chunk.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    pending: Vec<u8>,
    done: bool,
}

impl SseLineBuffer {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<StreamDelta, ChatModelError>> {
        self.pending.extend_from_slice(bytes);
        let mut out = Vec::new();

        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if self.done {
                continue;
            }
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();

            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim_start();
            if data == "[DONE]" {
                self.done = true;
                continue;
            }

            match serde_json::from_str::<ChatStreamChunk>(data) {
                Ok(chunk) => {
                    for choice in &chunk.choices {
                        let text = flatten_content(&choice.delta.content);
                        if !text.is_empty() {
                            out.push(Ok(StreamDelta::Content(text)));
                        }
                    }
                    if let Some(usage) = chunk.usage {
                        out.push(Ok(StreamDelta::Usage(usage)));
                    }
                }
                Err(e) => out.push(Err(ChatModelError::InvalidResponse(format!(
                    "Unparseable stream chunk: {}",
                    e
                )))),
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::chat_model::ChatMessage;
    use crate::domain::value_objects::MessageRole;
    use axum::{Json, Router, extract::State, http::StatusCode as AxumStatus, response::IntoResponse, routing::post};
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeddings endpoint that fails its first `failures` calls with
    /// `failure_status` and records the size of every batch it receives.
    struct MockEmbeddings {
        failures: usize,
        failure_status: AxumStatus,
        calls: AtomicUsize,
        batch_sizes: Mutex<Vec<usize>>,
    }

    async fn embeddings(
        State(mock): State<Arc<MockEmbeddings>>,
        Json(body): Json<Value>,
    ) -> axum::response::Response {
        let call = mock.calls.fetch_add(1, Ordering::SeqCst);
        if call < mock.failures {
            return (mock.failure_status, "try later").into_response();
        }

        let inputs = body["input"].as_array().cloned().unwrap_or_default();
        mock.batch_sizes.lock().unwrap().push(inputs.len());
        let data: Vec<Value> = (0..inputs.len())
            .map(|i| json!({ "index": i, "embedding": [i as f32, 1.0] }))
            .collect();
        Json(json!({ "data": data })).into_response()
    }

    async fn start_mock(failures: usize, failure_status: AxumStatus) -> (OpenAiEmbeddingProvider, Arc<MockEmbeddings>) {
        let mock = Arc::new(MockEmbeddings {
            failures,
            failure_status,
            calls: AtomicUsize::new(0),
            batch_sizes: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/embeddings", post(embeddings))
            .with_state(mock.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = OpenAiClient::new(OpenAiClientConfig {
            base_url: format!("http://{}", addr),
            api_key: "test-key".to_string(),
            max_retries: 3,
            timeout_secs: 5,
            backoff_factor: 1.5,
            backoff_base_ms: 1,
        })
        .unwrap();
        let provider = OpenAiEmbeddingProvider::new(client, "text-embedding-3-small".to_string(), 2);
        (provider, mock)
    }

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("trecho {}", i)).collect()
    }

    #[tokio::test]
    async fn test_embed_retries_after_rate_limit() {
        let (provider, mock) = start_mock(1, AxumStatus::TOO_MANY_REQUESTS).await;

        let vectors = provider.embed(&texts(2)).await.unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1].as_slice(), &[1.0, 1.0]);
        assert_eq!(mock.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_embed_gives_up_after_retries() {
        let (provider, mock) = start_mock(usize::MAX, AxumStatus::SERVICE_UNAVAILABLE).await;

        let result = provider.embed(&texts(1)).await;

        assert!(matches!(result, Err(EmbeddingProviderError::ServiceUnavailable)));
        assert_eq!(mock.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_embed_client_error_is_not_retried() {
        let (provider, mock) = start_mock(usize::MAX, AxumStatus::UNAUTHORIZED).await;

        let result = provider.embed(&texts(1)).await;

        assert!(matches!(result, Err(EmbeddingProviderError::ApiError(_))));
        assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_embed_splits_into_batches() {
        let (provider, mock) = start_mock(0, AxumStatus::OK).await;

        let vectors = provider.embed(&texts(250)).await.unwrap();

        assert_eq!(vectors.len(), 250);
        assert_eq!(*mock.batch_sizes.lock().unwrap(), vec![100, 100, 50]);
    }

    fn contents(items: Vec<Result<StreamDelta, ChatModelError>>) -> Vec<StreamDelta> {
        items.into_iter().map(|i| i.unwrap()).collect()
    }

    #[test]
    fn test_flatten_content() {
        assert_eq!(flatten_content(&json!("ola")), "ola");
        assert_eq!(
            flatten_content(&json!([{"type": "text", "text": "a"}, {"type": "text", "text": "b"}])),
            "ab"
        );
        assert_eq!(flatten_content(&Value::Null), "");
    }

    #[test]
    fn test_sse_buffer_joins_split_lines() {
        let mut buffer = SseLineBuffer::default();

        let first = buffer.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"Ol");
        assert!(first.is_empty());

        let second = buffer.push(b"a\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\" mundo\"}}]}\n");
        assert_eq!(
            contents(second),
            vec![
                StreamDelta::Content("Ola".to_string()),
                StreamDelta::Content(" mundo".to_string())
            ]
        );
    }

    #[test]
    fn test_sse_buffer_usage_and_done() {
        let mut buffer = SseLineBuffer::default();
        let items = buffer.push(
            b"data: {\"choices\":[],\"usage\":{\"prompt_tokens\":12,\"completion_tokens\":3}}\n\
              data: [DONE]\n\
              data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n",
        );

        assert_eq!(
            contents(items),
            vec![StreamDelta::Usage(Usage {
                prompt_tokens: 12,
                completion_tokens: 3
            })]
        );
    }

    #[test]
    fn test_sse_buffer_multibyte_split() {
        let mut buffer = SseLineBuffer::default();
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"pensão\"}}]}\n".as_bytes();
        let split = line.iter().position(|b| *b == 0xC3).unwrap() + 1;

        assert!(buffer.push(&line[..split]).is_empty());
        assert_eq!(
            contents(buffer.push(&line[split..])),
            vec![StreamDelta::Content("pensão".to_string())]
        );
    }

    #[test]
    fn test_collect_vectors_checks_shape() {
        let response = EmbeddingsResponse {
            data: vec![
                EmbeddingItem { index: 1, embedding: vec![0.0, 1.0] },
                EmbeddingItem { index: 0, embedding: vec![1.0, 0.0] },
            ],
        };
        let vectors = collect_vectors(response, 2, 2).unwrap();
        assert_eq!(vectors[0].as_slice(), &[1.0, 0.0]);

        let short = EmbeddingsResponse {
            data: vec![EmbeddingItem { index: 0, embedding: vec![1.0] }],
        };
        assert!(collect_vectors(short, 1, 2).is_err());

        let missing = EmbeddingsResponse { data: vec![] };
        assert!(collect_vectors(missing, 1, 2).is_err());
    }

    #[test]
    fn test_request_body() {
        let request = ChatRequest {
            model: "gpt-5-mini".to_string(),
            messages: vec![ChatMessage::new(MessageRole::User, "oi")],
            temperature: Some(1.0),
            max_completion_tokens: Some(4000),
            json_mode: false,
        };

        let body = serde_json::to_value(ChatCompletionBody::from_request(&request, true)).unwrap();
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["stream_options"]["include_usage"], true);
        assert!(body.get("response_format").is_none());
    }
}

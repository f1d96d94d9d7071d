pub mod chat_model;
pub mod embedding_provider;
pub mod job_queue;
pub mod report_renderer;
pub mod text_chunker;

pub use chat_model::{ChatMessage, ChatModel, ChatModelError, ChatRequest, Completion, StreamDelta, Usage};
pub use embedding_provider::{EmbeddingProvider, EmbeddingProviderError};
pub use job_queue::{DocumentJob, JobQueue, JobQueueError};
pub use report_renderer::{ReportRenderError, ReportRenderer, TransacoesReport};
pub use text_chunker::{TextChunk, TextChunker};

pub mod openai_client;
pub mod semantic_chunking;
pub mod xlsx_report;

pub use openai_client::{OpenAiChatModel, OpenAiClient, OpenAiClientConfig, OpenAiEmbeddingProvider};
pub use semantic_chunking::SentenceChunker;
pub use xlsx_report::XlsxReportRenderer;

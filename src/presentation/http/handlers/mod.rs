pub mod chat_handler;
pub mod document_handler;
pub mod processo_handler;
pub mod report_handler;
pub mod search_handler;
pub mod sse_handler;
pub mod transacao_handler;

pub use chat_handler::ChatHandler;
pub use document_handler::DocumentHandler;
pub use processo_handler::ProcessoHandler;
pub use report_handler::ReportHandler;
pub use search_handler::SearchHandler;
pub use sse_handler::SseHandler;
pub use transacao_handler::TransacaoHandler;

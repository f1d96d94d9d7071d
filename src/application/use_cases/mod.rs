pub mod error;
pub mod generate_report;
pub mod ingest_document;
pub mod manage_conversations;
pub mod manage_documents;
pub mod manage_processos;
pub mod review_transacoes;
pub mod search_content;
pub mod send_message;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::UseCaseError;
pub use generate_report::{GenerateReportUseCase, GeneratedReport, TransacoesReportRequest};
pub use ingest_document::{IngestDocumentRequest, IngestDocumentUseCase};
pub use manage_conversations::{ConversationHistory, ConversationSummary, ManageConversationsUseCase};
pub use manage_documents::{ManageDocumentsUseCase, TextSearchHit, UpdateOutcome};
pub use manage_processos::{CreateProcessoRequest, ManageProcessosUseCase, ProcessoDetails};
pub use review_transacoes::{ReviewTransacoesUseCase, TransacaoPage};
pub use search_content::{SearchContentRequest, SearchContentResponse, SearchContentUseCase};
pub use send_message::{ChatEvent, ChatExchange, SendMessageUseCase};

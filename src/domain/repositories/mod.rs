pub mod chunk_repository;
pub mod conversation_repository;
pub mod document_repository;
pub mod processo_repository;
pub mod repository_error;
pub mod transacao_repository;

pub use chunk_repository::{ChunkRepository, SimilarityQuery};
pub use conversation_repository::ConversationRepository;
pub use document_repository::{DocumentFilter, DocumentRepository};
pub use processo_repository::ProcessoRepository;
pub use repository_error::RepositoryError;
pub use transacao_repository::{TransacaoFilter, TransacaoReportFilter, TransacaoRepository};

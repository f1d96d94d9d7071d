pub mod postgres_chunk_repository;
pub mod postgres_conversation_repository;
pub mod postgres_document_repository;
pub mod postgres_processo_repository;
pub mod postgres_transacao_repository;

pub use postgres_chunk_repository::PostgresChunkRepository;
pub use postgres_conversation_repository::PostgresConversationRepository;
pub use postgres_document_repository::PostgresDocumentRepository;
pub use postgres_processo_repository::PostgresProcessoRepository;
pub use postgres_transacao_repository::PostgresTransacaoRepository;

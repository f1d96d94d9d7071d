pub mod document_processor;
pub mod financial_analyzer;
pub mod rag_service;
pub mod search_service;

pub use document_processor::DocumentProcessorService;
pub use financial_analyzer::FinancialAnalyzer;
pub use rag_service::RagService;
pub use search_service::SearchService;

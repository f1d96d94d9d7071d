pub mod chat_dto;
pub mod document_dto;
pub mod processo_dto;
pub mod report_dto;
pub mod response_dto;
pub mod search_dto;
pub mod transacao_dto;

pub use chat_dto::*;
pub use document_dto::*;
pub use processo_dto::*;
pub use report_dto::*;
pub use response_dto::*;
pub use search_dto::*;
pub use transacao_dto::*;

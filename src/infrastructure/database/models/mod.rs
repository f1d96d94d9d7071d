pub mod chunk_model;
pub mod conversation_model;
pub mod document_model;
pub mod processo_model;
pub mod transacao_model;

pub use chunk_model::*;
pub use conversation_model::*;
pub use document_model::*;
pub use processo_model::*;
pub use transacao_model::*;

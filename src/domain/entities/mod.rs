pub mod chunk;
pub mod conversation;
pub mod document;
pub mod processo;
pub mod transacao;

pub use chunk::{Chunk, ChunkMetadata, RetrievedChunk};
pub use conversation::{Conversation, Message, SourceInfo};
pub use document::{Document, DocumentChanges};
pub use processo::{Processo, ProcessoChanges};
pub use transacao::{Transacao, TransacaoChanges, TransacaoSummary, TransacaoTotal};

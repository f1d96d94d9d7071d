#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub content: String,
    pub token_count: usize,
}

pub trait TextChunker: Send + Sync {
    fn chunk_text(&self, text: &str) -> Vec<TextChunk>;
}

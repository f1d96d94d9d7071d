use regex::Regex;
use std::sync::LazyLock;

use crate::application::ports::text_chunker::{TextChunk, TextChunker};

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+|[^\w\s]").expect("token pattern is valid"));

/// Approximate token count: word runs plus individual punctuation marks.
pub fn count_tokens(text: &str) -> usize {
    TOKEN_PATTERN.find_iter(text).count()
}

/// Packs whole sentences into chunks of at most `chunk_size` tokens, carrying
/// up to `overlap` tokens of trailing sentences into the next chunk.
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    chunk_size: usize,
    overlap: usize,
}

impl SentenceChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            overlap,
        }
    }

    fn emit(sentences: &[(&str, usize)]) -> TextChunk {
        let content = sentences
            .iter()
            .map(|(s, _)| *s)
            .collect::<Vec<_>>()
            .join(" ");
        let token_count = count_tokens(&content);
        TextChunk {
            content,
            token_count,
        }
    }

    fn overlap_tail<'a>(&self, current: &[(&'a str, usize)]) -> Vec<(&'a str, usize)> {
        let mut tokens = 0;
        let mut start = current.len();
        for (i, (_, t)) in current.iter().enumerate().rev() {
            if tokens + t > self.overlap {
                break;
            }
            tokens += t;
            start = i;
        }
        current[start..].to_vec()
    }
}

impl TextChunker for SentenceChunker {
    fn chunk_text(&self, text: &str) -> Vec<TextChunk> {
        let mut chunks = Vec::new();
        let mut current: Vec<(&str, usize)> = Vec::new();
        let mut current_tokens = 0;

        for sentence in split_sentences(text) {
            let tokens = count_tokens(sentence);

            if current_tokens + tokens > self.chunk_size && !current.is_empty() {
                chunks.push(Self::emit(&current));
                current = self.overlap_tail(&current);
                current_tokens = current.iter().map(|(_, t)| t).sum();
            }

            current.push((sentence, tokens));
            current_tokens += tokens;
        }

        if !current.is_empty() {
            chunks.push(Self::emit(&current));
        }

        chunks
    }
}

/// Splits after `.`, `!`, `?` or a newline when whitespace follows, trimming
/// each sentence and dropping empty ones.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?' | '\n') {
            continue;
        }
        let end = i + c.len_utf8();
        match chars.peek() {
            Some((_, next)) if next.is_whitespace() => {}
            _ => continue,
        }
        sentences.push(&text[start..end]);
        while let Some((_, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            chars.next();
        }
        start = chars.peek().map(|(j, _)| *j).unwrap_or(text.len());
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

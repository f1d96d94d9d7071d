use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::MessageRole;

pub const TITLE_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub processo_id: Uuid,
    pub user_id: Uuid,
    pub channel: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(processo_id: Uuid, user_id: Uuid, title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            processo_id,
            user_id,
            channel: "web".to_string(),
            title: title.filter(|t| !t.trim().is_empty()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Untitled conversations are named after their first question.
    pub fn title_from_question(&self, question: &str) -> Option<String> {
        if self.title.is_some() {
            return None;
        }
        Some(question.trim().chars().take(TITLE_MAX_CHARS).collect())
    }
}

/// A document cited by an assistant answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub doc_title: String,
    pub doc_kind: String,
    pub document_id: Uuid,
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub chunks_used: Vec<Uuid>,
    pub tokens_input: Option<i32>,
    pub tokens_output: Option<i32>,
    pub cost_usd: Option<f64>,
    pub sources: Vec<SourceInfo>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(conversation_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            role: MessageRole::User,
            content,
            chunks_used: Vec::new(),
            tokens_input: None,
            tokens_output: None,
            cost_usd: None,
            sources: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(
        conversation_id: Uuid,
        content: String,
        chunks_used: Vec<Uuid>,
        tokens_input: i32,
        tokens_output: i32,
        cost_usd: f64,
        sources: Vec<SourceInfo>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            role: MessageRole::Assistant,
            content,
            chunks_used,
            tokens_input: Some(tokens_input),
            tokens_output: Some(tokens_output),
            cost_usd: Some(cost_usd),
            sources,
            created_at: Utc::now(),
        }
    }
}

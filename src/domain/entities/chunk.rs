use chrono::{DateTime, NaiveDate, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::Document;

/// Document attributes copied onto each chunk so retrieval results can cite
/// their source without a join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub doc_kind: String,
    pub doc_title: String,
    #[serde(default)]
    pub participants: Vec<String>,
    pub reference_date: Option<String>,
}

impl ChunkMetadata {
    pub fn from_document(document: &Document) -> Self {
        Self {
            doc_kind: document.kind().to_string(),
            doc_title: document.title().to_string(),
            participants: document.participants().map(|p| p.to_vec()).unwrap_or_default(),
            reference_date: document.reference_date().map(|d| d.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    id: Uuid,
    document_id: Uuid,
    content: String,
    position: i32,
    token_count: Option<i32>,
    embedding: Option<Vector>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl Chunk {
    pub fn new(
        document_id: Uuid,
        content: String,
        position: i32,
        token_count: Option<i32>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            content,
            position,
            token_count,
            embedding: None,
            metadata,
            created_at: Utc::now(),
        }
    }

    pub fn from_database(
        id: Uuid,
        document_id: Uuid,
        content: String,
        position: i32,
        token_count: Option<i32>,
        embedding: Option<Vector>,
        metadata: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            document_id,
            content,
            position,
            token_count,
            embedding,
            metadata,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn token_count(&self) -> Option<i32> {
        self.token_count
    }

    pub fn embedding(&self) -> Option<&Vector> {
        self.embedding.as_ref()
    }

    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Attaches an embedding, refusing vectors that would not fit the column.
    pub fn set_embedding(&mut self, embedding: Vector, expected_dimension: usize) -> Result<(), String> {
        let dimension = embedding.as_slice().len();
        if dimension != expected_dimension {
            return Err(format!(
                "Embedding for chunk {} has {} dimensions, expected {}",
                self.id, dimension, expected_dimension
            ));
        }
        self.embedding = Some(embedding);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// One similarity-search hit together with the document it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk_id: Uuid,
    pub content: String,
    pub position: i32,
    pub document_id: Uuid,
    pub doc_title: String,
    pub doc_kind: String,
    pub participants: Vec<String>,
    pub reference_date: Option<NaiveDate>,
    pub similarity: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_embedding_checks_dimension() {
        let mut chunk = Chunk::new(Uuid::new_v4(), "Pagamento da escola".to_string(), 0, Some(3), serde_json::json!({}));

        assert!(chunk.set_embedding(Vector::from(vec![0.1, 0.2]), 3).is_err());
        assert!(chunk.embedding().is_none());

        chunk.set_embedding(Vector::from(vec![0.1, 0.2, 0.3]), 3).unwrap();
        assert_eq!(chunk.embedding().unwrap().as_slice().len(), 3);
    }

    #[test]
    fn test_metadata_from_document() {
        let document = Document::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "whatsapp".to_string(),
            "Grupo da familia".to_string(),
            None,
            Some(vec!["Ana".to_string(), "Pedro".to_string()]),
            NaiveDate::from_ymd_opt(2023, 5, 2),
            "texto".to_string(),
        )
        .unwrap();

        let metadata = ChunkMetadata::from_document(&document);
        assert_eq!(metadata.doc_kind, "whatsapp");
        assert_eq!(metadata.participants, vec!["Ana", "Pedro"]);
        assert_eq!(metadata.reference_date.as_deref(), Some("2023-05-02"));

        let json = metadata.to_json();
        assert_eq!(json["doc_title"], "Grupo da familia");
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Uploaded,
    Processing,
    Processed,
    Error,
}

impl DocumentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Processed | DocumentStatus::Error)
    }

    pub fn can_transition_to(&self, new_status: DocumentStatus) -> bool {
        match (self, new_status) {
            (DocumentStatus::Uploaded, DocumentStatus::Processing) => true,
            (DocumentStatus::Processing, DocumentStatus::Processed) => true,
            (DocumentStatus::Processing, DocumentStatus::Error) => true,
            // Reprocessing after a failure or an embedding model change.
            (DocumentStatus::Error, DocumentStatus::Processing) => true,
            (DocumentStatus::Processed, DocumentStatus::Processing) => true,
            // A crashed worker can leave a document stuck in processing.
            (DocumentStatus::Processing, DocumentStatus::Processing) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Uploaded => "uploaded",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Processed => "processed",
            DocumentStatus::Error => "error",
        }
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "uploaded" => Ok(DocumentStatus::Uploaded),
            "processing" => Ok(DocumentStatus::Processing),
            "processed" => Ok(DocumentStatus::Processed),
            "error" => Ok(DocumentStatus::Error),
            _ => Err(format!("Invalid document status: {}", s)),
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

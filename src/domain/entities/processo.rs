use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A legal case folder. Documents, transactions and conversations hang off it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Processo {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub numero: Option<String>,
    pub title: String,
    pub description: Option<String>,
    /// Free text the user writes about the case; prepended to every chat prompt.
    pub context: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const NUMERO_MAX_CHARS: usize = 50;
const STATUS_MAX_CHARS: usize = 20;

/// Fields a caller may change after creation. Blank description or context
/// clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessoChanges {
    pub numero: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub context: Option<String>,
    pub status: Option<String>,
}

impl ProcessoChanges {
    pub fn is_empty(&self) -> bool {
        self.numero.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.context.is_none()
            && self.status.is_none()
    }
}

impl Processo {
    pub fn new(
        owner_id: Uuid,
        numero: Option<String>,
        title: String,
        description: Option<String>,
        context: Option<String>,
    ) -> Result<Self, String> {
        if title.trim().is_empty() {
            return Err("Title cannot be empty".to_string());
        }
        if numero.as_ref().is_some_and(|n| n.chars().count() > NUMERO_MAX_CHARS) {
            return Err("Numero cannot exceed 50 characters".to_string());
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            numero,
            title: title.trim().to_string(),
            description,
            context: context.filter(|c| !c.trim().is_empty()),
            status: "ativo".to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Validates every change before touching any field.
    pub fn apply_changes(&mut self, changes: &ProcessoChanges) -> Result<(), String> {
        if changes.title.as_ref().is_some_and(|t| t.trim().is_empty()) {
            return Err("Title cannot be empty".to_string());
        }
        if changes
            .numero
            .as_ref()
            .is_some_and(|n| n.chars().count() > NUMERO_MAX_CHARS)
        {
            return Err("Numero cannot exceed 50 characters".to_string());
        }
        if let Some(status) = &changes.status {
            let status = status.trim();
            if status.is_empty() || status.chars().count() > STATUS_MAX_CHARS {
                return Err("Status must have between 1 and 20 characters".to_string());
            }
        }

        if let Some(numero) = &changes.numero {
            self.numero = Some(numero.trim().to_string()).filter(|n| !n.is_empty());
        }
        if let Some(title) = &changes.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &changes.description {
            self.description = Some(description.clone()).filter(|d| !d.trim().is_empty());
        }
        if let Some(context) = &changes.context {
            self.context = Some(context.clone()).filter(|c| !c.trim().is_empty());
        }
        if let Some(status) = &changes.status {
            self.status = status.trim().to_string();
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

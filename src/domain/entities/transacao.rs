use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::TransactionCategory;

/// A financial transaction mined from a bank statement or receipt. Stays
/// unreviewed until a person confirms it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transacao {
    pub id: Uuid,
    pub processo_id: Uuid,
    pub description: String,
    pub amount_cents: Option<i64>,
    pub date: Option<NaiveDate>,
    pub payer: Option<String>,
    pub payee: Option<String>,
    pub category: Option<TransactionCategory>,
    pub confidence: Option<f32>,
    pub reviewed: bool,
    pub reviewed_by: Option<Uuid>,
    pub source_chunk_ids: Vec<Uuid>,
    pub source_document_ids: Vec<Uuid>,
    pub evidence: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransacaoChanges {
    pub date: Option<NaiveDate>,
    pub payer: Option<String>,
    pub payee: Option<String>,
    pub category: Option<TransactionCategory>,
}

impl Transacao {
    pub fn apply_changes(&mut self, changes: TransacaoChanges) {
        if let Some(date) = changes.date {
            self.date = Some(date);
        }
        if let Some(payer) = changes.payer {
            self.payer = Some(payer);
        }
        if let Some(payee) = changes.payee {
            self.payee = Some(payee);
        }
        if let Some(category) = changes.category {
            self.category = Some(category);
        }
        self.updated_at = Utc::now();
    }

    pub fn confirm(&mut self, reviewer: Uuid) {
        self.reviewed = true;
        self.reviewed_by = Some(reviewer);
        self.updated_at = Utc::now();
    }
}

/// Aggregated amounts for one grouping key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransacaoTotal {
    pub key: Option<String>,
    pub total_cents: i64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransacaoSummary {
    pub by_category: Vec<TransacaoTotal>,
    pub by_payer: Vec<TransacaoTotal>,
    pub total_cents: i64,
    pub total_count: i64,
}

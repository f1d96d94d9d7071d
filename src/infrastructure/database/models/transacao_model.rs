use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Transacao;
use crate::domain::value_objects::TransactionCategory;
use crate::infrastructure::database::schema::transacoes;

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset, Identifiable)]
#[diesel(table_name = transacoes)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TransacaoModel {
    pub id: Uuid,
    pub processo_id: Uuid,
    pub description: String,
    pub amount_cents: Option<i64>,
    pub date: Option<NaiveDate>,
    pub payer: Option<String>,
    pub payee: Option<String>,
    pub category: Option<String>,
    pub confidence: Option<f32>,
    pub reviewed: bool,
    pub reviewed_by: Option<Uuid>,
    pub source_chunk_ids: Option<Vec<Uuid>>,
    pub source_document_ids: Option<Vec<Uuid>>,
    pub evidence: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Transacao> for TransacaoModel {
    fn from(t: &Transacao) -> Self {
        Self {
            id: t.id,
            processo_id: t.processo_id,
            description: t.description.clone(),
            amount_cents: t.amount_cents,
            date: t.date,
            payer: t.payer.clone(),
            payee: t.payee.clone(),
            category: t.category.map(|c| c.as_str().to_string()),
            confidence: t.confidence,
            reviewed: t.reviewed,
            reviewed_by: t.reviewed_by,
            source_chunk_ids: Some(t.source_chunk_ids.clone()),
            source_document_ids: Some(t.source_document_ids.clone()),
            evidence: t.evidence.clone(),
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl From<TransacaoModel> for Transacao {
    fn from(model: TransacaoModel) -> Self {
        Transacao {
            id: model.id,
            processo_id: model.processo_id,
            description: model.description,
            amount_cents: model.amount_cents,
            date: model.date,
            payer: model.payer,
            payee: model.payee,
            category: model
                .category
                .as_deref()
                .map(|c| TransactionCategory::normalize(Some(c))),
            confidence: model.confidence,
            reviewed: model.reviewed,
            reviewed_by: model.reviewed_by,
            source_chunk_ids: model.source_chunk_ids.unwrap_or_default(),
            source_document_ids: model.source_document_ids.unwrap_or_default(),
            evidence: model.evidence,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

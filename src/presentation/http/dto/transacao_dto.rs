use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::use_cases::TransacaoPage;
use crate::domain::entities::{Transacao, TransacaoChanges, TransacaoSummary, TransacaoTotal};
use crate::domain::repositories::TransacaoFilter;
use crate::domain::value_objects::TransactionCategory;

#[derive(Debug, Deserialize)]
pub struct TransacaoListQuery {
    pub processo_id: Uuid,
    #[serde(rename = "categoria")]
    pub category: Option<TransactionCategory>,
    #[serde(rename = "pagador")]
    pub payer: Option<String>,
    #[serde(rename = "revisado")]
    pub reviewed: Option<bool>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default)]
    pub limit: i64,
}

impl From<TransacaoListQuery> for TransacaoFilter {
    fn from(query: TransacaoListQuery) -> Self {
        Self {
            processo_id: query.processo_id,
            category: query.category,
            payer: query.payer.filter(|p| !p.trim().is_empty()),
            reviewed: query.reviewed,
            skip: query.skip,
            limit: query.limit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub processo_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTransacaoDto {
    pub date: Option<NaiveDate>,
    pub payer: Option<String>,
    pub payee: Option<String>,
    pub category: Option<TransactionCategory>,
}

impl From<UpdateTransacaoDto> for TransacaoChanges {
    fn from(dto: UpdateTransacaoDto) -> Self {
        Self {
            date: dto.date,
            payer: dto.payer,
            payee: dto.payee,
            category: dto.category,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConfirmTransacaoDto {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TransacaoResponseDto {
    pub id: Uuid,
    pub processo_id: Uuid,
    pub description: String,
    pub amount_cents: Option<i64>,
    pub amount: Option<f64>,
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

fn reais(cents: i64) -> f64 {
    cents as f64 / 100.0
}

impl From<Transacao> for TransacaoResponseDto {
    fn from(t: Transacao) -> Self {
        Self {
            id: t.id,
            processo_id: t.processo_id,
            description: t.description,
            amount_cents: t.amount_cents,
            amount: t.amount_cents.map(reais),
            date: t.date,
            payer: t.payer,
            payee: t.payee,
            category: t.category,
            confidence: t.confidence,
            reviewed: t.reviewed,
            reviewed_by: t.reviewed_by,
            source_chunk_ids: t.source_chunk_ids,
            source_document_ids: t.source_document_ids,
            evidence: t.evidence,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransacaoListResponseDto {
    pub transacoes: Vec<TransacaoResponseDto>,
    pub total: i64,
}

impl From<TransacaoPage> for TransacaoListResponseDto {
    fn from(page: TransacaoPage) -> Self {
        Self {
            transacoes: page
                .transacoes
                .into_iter()
                .map(TransacaoResponseDto::from)
                .collect(),
            total: page.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TotalDto {
    pub key: Option<String>,
    pub total_cents: i64,
    pub total: f64,
    pub count: i64,
}

impl From<TransacaoTotal> for TotalDto {
    fn from(total: TransacaoTotal) -> Self {
        Self {
            key: total.key,
            total_cents: total.total_cents,
            total: reais(total.total_cents),
            count: total.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransacaoSummaryDto {
    pub by_category: Vec<TotalDto>,
    pub by_payer: Vec<TotalDto>,
    pub total_cents: i64,
    pub total: f64,
    pub total_count: i64,
}

impl From<TransacaoSummary> for TransacaoSummaryDto {
    fn from(summary: TransacaoSummary) -> Self {
        Self {
            by_category: summary.by_category.into_iter().map(TotalDto::from).collect(),
            by_payer: summary.by_payer.into_iter().map(TotalDto::from).collect(),
            total_cents: summary.total_cents,
            total: reais(summary.total_cents),
            total_count: summary.total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_uses_portuguese_names() {
        let query: TransacaoListQuery = serde_json::from_value(serde_json::json!({
            "processo_id": "7f1d2a9e-1c1b-4c43-9d64-0d7f4a1f7a10",
            "categoria": "saude",
            "pagador": "Ana",
            "revisado": false
        }))
        .unwrap();

        let filter = TransacaoFilter::from(query);
        assert_eq!(filter.category, Some(TransactionCategory::Saude));
        assert_eq!(filter.payer.as_deref(), Some("Ana"));
        assert_eq!(filter.reviewed, Some(false));
        assert_eq!(filter.limit, 0);
    }

    #[test]
    fn test_summary_in_reais() {
        let dto = TransacaoSummaryDto::from(TransacaoSummary {
            by_category: vec![TransacaoTotal {
                key: Some("educacao".to_string()),
                total_cents: -120_050,
                count: 2,
            }],
            by_payer: Vec::new(),
            total_cents: -120_050,
            total_count: 2,
        });
        assert_eq!(dto.total, -1200.5);
        assert_eq!(dto.by_category[0].total, -1200.5);
    }
}

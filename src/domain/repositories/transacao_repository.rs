use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::entities::{Transacao, TransacaoSummary};
use crate::domain::value_objects::TransactionCategory;

#[derive(Debug, Clone, Default)]
pub struct TransacaoFilter {
    pub processo_id: Uuid,
    pub category: Option<TransactionCategory>,
    pub payer: Option<String>,
    pub reviewed: Option<bool>,
    pub skip: i64,
    pub limit: i64,
}

/// Selects the rows of a transactions report. Empty lists mean no filter.
#[derive(Debug, Clone, Default)]
pub struct TransacaoReportFilter {
    pub processo_id: Uuid,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub categories: Vec<TransactionCategory>,
    pub payers: Vec<String>,
}

#[async_trait]
pub trait TransacaoRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transacao>, RepositoryError>;
    /// Newest first, undated last. Returns the page and the unpaged total.
    async fn list(&self, filter: &TransacaoFilter) -> Result<(Vec<Transacao>, i64), RepositoryError>;
    /// Every matching transaction, newest first, undated last.
    async fn find_for_report(&self, filter: &TransacaoReportFilter) -> Result<Vec<Transacao>, RepositoryError>;
    async fn summary(&self, processo_id: Uuid) -> Result<TransacaoSummary, RepositoryError>;
    async fn update(&self, transacao: &Transacao) -> Result<(), RepositoryError>;
    /// Atomically swaps the unreviewed transactions extracted from a
    /// document for `transacoes`. Reviewed ones are kept. Returns how many
    /// were removed.
    async fn replace_unreviewed_for_document(
        &self,
        document_id: Uuid,
        transacoes: &[Transacao],
    ) -> Result<i64, RepositoryError>;
}

use std::sync::Arc;
use uuid::Uuid;

use super::UseCaseError;
use crate::domain::entities::{Transacao, TransacaoChanges, TransacaoSummary};
use crate::domain::repositories::{TransacaoFilter, TransacaoRepository};

const DEFAULT_PAGE_SIZE: i64 = 100;
const MAX_PAGE_SIZE: i64 = 500;

#[derive(Debug, Clone)]
pub struct TransacaoPage {
    pub transacoes: Vec<Transacao>,
    pub total: i64,
}

pub struct ReviewTransacoesUseCase {
    transacao_repository: Arc<dyn TransacaoRepository>,
}

impl ReviewTransacoesUseCase {
    pub fn new(transacao_repository: Arc<dyn TransacaoRepository>) -> Self {
        Self { transacao_repository }
    }

    pub async fn list(&self, mut filter: TransacaoFilter) -> Result<TransacaoPage, UseCaseError> {
        if filter.skip < 0 {
            return Err(UseCaseError::ValidationError("skip cannot be negative".to_string()));
        }
        if filter.limit <= 0 {
            filter.limit = DEFAULT_PAGE_SIZE;
        }
        filter.limit = filter.limit.min(MAX_PAGE_SIZE);

        let (transacoes, total) = self.transacao_repository.list(&filter).await?;
        Ok(TransacaoPage { transacoes, total })
    }

    pub async fn summary(&self, processo_id: Uuid) -> Result<TransacaoSummary, UseCaseError> {
        Ok(self.transacao_repository.summary(processo_id).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Transacao, UseCaseError> {
        self.transacao_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UseCaseError::not_found("Transacao", id))
    }

    pub async fn update(&self, id: Uuid, changes: TransacaoChanges) -> Result<Transacao, UseCaseError> {
        let mut transacao = self.get(id).await?;
        transacao.apply_changes(changes);
        self.transacao_repository.update(&transacao).await?;
        Ok(transacao)
    }

    /// Marks the transaction as reviewed by `reviewer`. Reviewed transactions
    /// survive re-extraction of their document.
    pub async fn confirm(&self, id: Uuid, reviewer: Uuid) -> Result<Transacao, UseCaseError> {
        let mut transacao = self.get(id).await?;
        transacao.confirm(reviewer);
        self.transacao_repository.update(&transacao).await?;
        tracing::info!("Transacao {} confirmed by {}", id, reviewer);
        Ok(transacao)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::test_support::FakeTransacoes;
    use crate::domain::value_objects::TransactionCategory;
    use chrono::{NaiveDate, Utc};

    fn transacao(processo_id: Uuid, payer: &str, category: TransactionCategory) -> Transacao {
        Transacao {
            id: Uuid::new_v4(),
            processo_id,
            description: "Mensalidade escolar".to_string(),
            amount_cents: Some(-120_000),
            date: NaiveDate::from_ymd_opt(2024, 3, 5),
            payer: Some(payer.to_string()),
            payee: Some("Escola".to_string()),
            category: Some(category),
            confidence: Some(0.9),
            reviewed: false,
            reviewed_by: None,
            source_chunk_ids: vec![Uuid::new_v4()],
            source_document_ids: vec![Uuid::new_v4()],
            evidence: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let processo_id = Uuid::new_v4();
        let repo = Arc::new(FakeTransacoes::with(vec![
            transacao(processo_id, "Ana", TransactionCategory::Educacao),
            transacao(processo_id, "Pedro", TransactionCategory::Educacao),
            transacao(processo_id, "Ana", TransactionCategory::Saude),
            transacao(Uuid::new_v4(), "Ana", TransactionCategory::Educacao),
        ]));
        let use_case = ReviewTransacoesUseCase::new(repo);

        let page = use_case
            .list(TransacaoFilter {
                processo_id,
                category: Some(TransactionCategory::Educacao),
                limit: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.transacoes.len(), 1);

        let by_payer = use_case
            .list(TransacaoFilter {
                processo_id,
                payer: Some("Ana".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_payer.total, 2);
    }

    #[tokio::test]
    async fn test_update_and_confirm() {
        let processo_id = Uuid::new_v4();
        let original = transacao(processo_id, "incerto", TransactionCategory::Outros);
        let id = original.id;
        let repo = Arc::new(FakeTransacoes::with(vec![original]));
        let use_case = ReviewTransacoesUseCase::new(repo.clone());

        use_case
            .update(
                id,
                TransacaoChanges {
                    payer: Some("Pedro".to_string()),
                    category: Some(TransactionCategory::Educacao),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let reviewer = Uuid::new_v4();
        let confirmed = use_case.confirm(id, reviewer).await.unwrap();
        assert!(confirmed.reviewed);

        let stored = repo.get(id).unwrap();
        assert_eq!(stored.payer.as_deref(), Some("Pedro"));
        assert_eq!(stored.category, Some(TransactionCategory::Educacao));
        assert_eq!(stored.payee.as_deref(), Some("Escola"));
        assert_eq!(stored.reviewed_by, Some(reviewer));
    }

    #[tokio::test]
    async fn test_missing_transacao() {
        let use_case = ReviewTransacoesUseCase::new(Arc::new(FakeTransacoes::default()));
        let result = use_case.confirm(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(UseCaseError::NotFound(_))));
    }
}

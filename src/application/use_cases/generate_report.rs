use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::UseCaseError;
use crate::application::ports::{ReportRenderer, TransacoesReport};
use crate::domain::repositories::{ProcessoRepository, TransacaoReportFilter, TransacaoRepository};
use crate::domain::value_objects::TransactionCategory;

#[derive(Debug, Clone, Default)]
pub struct TransacoesReportRequest {
    pub processo_id: Uuid,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub categories: Vec<String>,
    pub payers: Vec<String>,
}

/// A rendered file, ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub row_count: usize,
}

pub struct GenerateReportUseCase {
    processo_repository: Arc<dyn ProcessoRepository>,
    transacao_repository: Arc<dyn TransacaoRepository>,
    renderer: Arc<dyn ReportRenderer>,
}

impl GenerateReportUseCase {
    pub fn new(
        processo_repository: Arc<dyn ProcessoRepository>,
        transacao_repository: Arc<dyn TransacaoRepository>,
        renderer: Arc<dyn ReportRenderer>,
    ) -> Self {
        Self {
            processo_repository,
            transacao_repository,
            renderer,
        }
    }

    pub async fn transacoes(&self, request: TransacoesReportRequest) -> Result<GeneratedReport, UseCaseError> {
        if let (Some(from), Some(to)) = (request.date_from, request.date_to) {
            if from > to {
                return Err(UseCaseError::ValidationError(
                    "date_from must not be after date_to".to_string(),
                ));
            }
        }
        let categories = request
            .categories
            .iter()
            .map(|c| {
                TransactionCategory::parse(c).ok_or_else(|| {
                    UseCaseError::ValidationError(format!(
                        "Unknown category '{}'. Options: {}",
                        c,
                        TransactionCategory::joined()
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let processo = self
            .processo_repository
            .find_by_id(request.processo_id)
            .await?
            .ok_or_else(|| UseCaseError::not_found("Processo", request.processo_id))?;

        let filter = TransacaoReportFilter {
            processo_id: processo.id,
            date_from: request.date_from,
            date_to: request.date_to,
            categories,
            payers: request
                .payers
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        };
        let transacoes = self.transacao_repository.find_for_report(&filter).await?;

        let generated_at = Utc::now();
        let report = TransacoesReport {
            processo_title: processo.title,
            generated_at,
            date_from: request.date_from,
            date_to: request.date_to,
            transacoes,
        };
        let bytes = self.renderer.render_transacoes(&report)?;

        tracing::info!(
            "Generated transactions report for processo {} ({} rows)",
            processo.id,
            report.transacoes.len()
        );
        Ok(GeneratedReport {
            file_name: format!(
                "transacoes_{}_{}.{}",
                processo.id,
                generated_at.format("%Y%m%d_%H%M%S"),
                self.renderer.extension()
            ),
            content_type: self.renderer.content_type(),
            bytes,
            row_count: report.transacoes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::application::ports::ReportRenderError;
    use crate::application::use_cases::test_support::{FakeProcessos, FakeTransacoes, processo};
    use crate::domain::entities::Transacao;

    #[derive(Default)]
    struct CapturingRenderer {
        rendered: Mutex<Vec<TransacoesReport>>,
        fail: bool,
    }

    impl ReportRenderer for CapturingRenderer {
        fn render_transacoes(&self, report: &TransacoesReport) -> Result<Vec<u8>, ReportRenderError> {
            if self.fail {
                return Err(ReportRenderError("disk full".to_string()));
            }
            self.rendered.lock().unwrap().push(report.clone());
            Ok(b"PK".to_vec())
        }

        fn content_type(&self) -> &'static str {
            "application/test"
        }

        fn extension(&self) -> &'static str {
            "bin"
        }
    }

    fn transacao(processo_id: Uuid, description: &str, date: Option<NaiveDate>, category: TransactionCategory, payer: &str) -> Transacao {
        let now = Utc::now();
        Transacao {
            id: Uuid::new_v4(),
            processo_id,
            description: description.to_string(),
            amount_cents: Some(-10000),
            date,
            payer: Some(payer.to_string()),
            payee: None,
            category: Some(category),
            confidence: Some(0.8),
            reviewed: false,
            reviewed_by: None,
            source_chunk_ids: Vec::new(),
            source_document_ids: Vec::new(),
            evidence: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn setup(renderer: Arc<CapturingRenderer>) -> (GenerateReportUseCase, Uuid) {
        let owner = processo();
        let id = owner.id;
        let date = |d| NaiveDate::from_ymd_opt(2024, 3, d);
        let transacoes = FakeTransacoes::with(vec![
            transacao(id, "Escola marco", date(10), TransactionCategory::Educacao, "Ana"),
            transacao(id, "Farmacia", date(20), TransactionCategory::Saude, "Pedro"),
            transacao(id, "Material escolar", None, TransactionCategory::Educacao, "Ana"),
            transacao(id, "Escola abril", NaiveDate::from_ymd_opt(2024, 4, 10), TransactionCategory::Educacao, "Ana"),
            transacao(Uuid::new_v4(), "Outro processo", date(11), TransactionCategory::Educacao, "Ana"),
        ]);
        let use_case = GenerateReportUseCase::new(
            Arc::new(FakeProcessos::with(vec![owner])),
            Arc::new(transacoes),
            renderer,
        );
        (use_case, id)
    }

    #[tokio::test]
    async fn test_report_filters_and_orders_rows() {
        let renderer = Arc::new(CapturingRenderer::default());
        let (use_case, processo_id) = setup(renderer.clone());

        let report = use_case
            .transacoes(TransacoesReportRequest {
                processo_id,
                categories: vec!["Educacao".to_string()],
                payers: vec!["Ana".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(report.row_count, 3);
        assert_eq!(report.content_type, "application/test");
        assert!(report.file_name.starts_with(&format!("transacoes_{}_", processo_id)));
        assert!(report.file_name.ends_with(".bin"));

        let rendered = renderer.rendered.lock().unwrap();
        let descriptions: Vec<&str> = rendered[0]
            .transacoes
            .iter()
            .map(|t| t.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["Escola abril", "Escola marco", "Material escolar"]);
        assert_eq!(rendered[0].processo_title, "Revisao de alimentos");
    }

    #[tokio::test]
    async fn test_report_date_range() {
        let renderer = Arc::new(CapturingRenderer::default());
        let (use_case, processo_id) = setup(renderer.clone());

        let report = use_case
            .transacoes(TransacoesReportRequest {
                processo_id,
                date_from: NaiveDate::from_ymd_opt(2024, 3, 1),
                date_to: NaiveDate::from_ymd_opt(2024, 3, 31),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(report.row_count, 2);
    }

    #[tokio::test]
    async fn test_report_rejects_bad_requests() {
        let (use_case, processo_id) = setup(Arc::new(CapturingRenderer::default()));

        let inverted = use_case
            .transacoes(TransacoesReportRequest {
                processo_id,
                date_from: NaiveDate::from_ymd_opt(2024, 4, 1),
                date_to: NaiveDate::from_ymd_opt(2024, 3, 1),
                ..Default::default()
            })
            .await;
        assert!(matches!(inverted, Err(UseCaseError::ValidationError(_))));

        let unknown_category = use_case
            .transacoes(TransacoesReportRequest {
                processo_id,
                categories: vec!["viagem".to_string()],
                ..Default::default()
            })
            .await;
        assert!(matches!(unknown_category, Err(UseCaseError::ValidationError(_))));

        let missing = use_case
            .transacoes(TransacoesReportRequest {
                processo_id: Uuid::new_v4(),
                ..Default::default()
            })
            .await;
        assert!(matches!(missing, Err(UseCaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_render_failure_is_report_error() {
        let renderer = Arc::new(CapturingRenderer {
            fail: true,
            ..Default::default()
        });
        let (use_case, processo_id) = setup(renderer);

        let result = use_case
            .transacoes(TransacoesReportRequest {
                processo_id,
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(UseCaseError::ReportError(_))));
    }
}

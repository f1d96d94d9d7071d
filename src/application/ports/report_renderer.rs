use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::entities::Transacao;

/// Everything a transactions spreadsheet shows, already filtered and ordered.
#[derive(Debug, Clone)]
pub struct TransacoesReport {
    pub processo_title: String,
    pub generated_at: DateTime<Utc>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub transacoes: Vec<Transacao>,
}

impl TransacoesReport {
    pub fn total_cents(&self) -> i64 {
        self.transacoes.iter().filter_map(|t| t.amount_cents).sum()
    }
}

#[derive(Debug)]
pub struct ReportRenderError(pub String);

impl std::fmt::Display for ReportRenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Report rendering failed: {}", self.0)
    }
}

impl std::error::Error for ReportRenderError {}

pub trait ReportRenderer: Send + Sync {
    fn render_transacoes(&self, report: &TransacoesReport) -> Result<Vec<u8>, ReportRenderError>;
    fn content_type(&self) -> &'static str;
    fn extension(&self) -> &'static str;
}

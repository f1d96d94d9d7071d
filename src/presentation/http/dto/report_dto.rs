use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::application::use_cases::TransacoesReportRequest;

#[derive(Debug, Deserialize)]
pub struct TransacoesReportDto {
    pub processo_id: Uuid,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub payers: Vec<String>,
}

impl From<TransacoesReportDto> for TransacoesReportRequest {
    fn from(dto: TransacoesReportDto) -> Self {
        Self {
            processo_id: dto.processo_id,
            date_from: dto.date_from,
            date_to: dto.date_to,
            categories: dto.categories,
            payers: dto.payers,
        }
    }
}

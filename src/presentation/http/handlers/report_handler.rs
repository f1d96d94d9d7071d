use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::use_cases::GenerateReportUseCase;
use crate::presentation::http::dto::{TransacoesReportDto, error_response};

pub struct ReportHandler {
    report_use_case: Arc<GenerateReportUseCase>,
}

impl ReportHandler {
    pub fn new(report_use_case: Arc<GenerateReportUseCase>) -> Self {
        Self { report_use_case }
    }

    /// Answers with the spreadsheet itself as an attachment.
    pub async fn transacoes_report(
        State(handler): State<Arc<ReportHandler>>,
        Json(payload): Json<TransacoesReportDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.report_use_case.transacoes(payload.into()).await {
            Ok(report) => Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, report.content_type.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", report.file_name),
                    ),
                ],
                report.bytes,
            )
                .into_response()),
            Err(e) => Ok(error_response(&e)),
        }
    }
}

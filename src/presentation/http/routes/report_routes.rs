use axum::{Router, routing::post};
use std::sync::Arc;

use crate::presentation::http::handlers::ReportHandler;

pub fn report_routes(report_handler: Arc<ReportHandler>) -> Router {
    Router::new()
        .route(
            "/reports/transacoes",
            post(ReportHandler::transacoes_report),
        )
        .with_state(report_handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::application::use_cases::GenerateReportUseCase;
    use crate::application::use_cases::test_support::{FakeProcessos, FakeTransacoes, processo};
    use crate::infrastructure::external_services::XlsxReportRenderer;

    fn app() -> (Router, uuid::Uuid) {
        let owner = processo();
        let processo_id = owner.id;
        let use_case = GenerateReportUseCase::new(
            Arc::new(FakeProcessos::with(vec![owner])),
            Arc::new(FakeTransacoes::default()),
            Arc::new(XlsxReportRenderer::new()),
        );
        (
            report_routes(Arc::new(ReportHandler::new(Arc::new(use_case)))),
            processo_id,
        )
    }

    fn post_json(body: serde_json::Value) -> Request<Body> {
        Request::post("/reports/transacoes")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_download_transacoes_spreadsheet() {
        let (app, processo_id) = app();

        let response = app
            .oneshot(post_json(serde_json::json!({ "processo_id": processo_id })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains(".xlsx"));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_unknown_processo_is_json_error() {
        let (app, _) = app();

        let response = app
            .oneshot(post_json(serde_json::json!({ "processo_id": uuid::Uuid::new_v4() })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

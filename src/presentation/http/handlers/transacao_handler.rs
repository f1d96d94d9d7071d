use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::use_cases::ReviewTransacoesUseCase;
use crate::presentation::http::dto::{
    ConfirmTransacaoDto, SummaryQuery, TransacaoListQuery, TransacaoListResponseDto,
    TransacaoResponseDto, TransacaoSummaryDto, UpdateTransacaoDto, error_response,
    success_response,
};

pub struct TransacaoHandler {
    review_use_case: Arc<ReviewTransacoesUseCase>,
}

impl TransacaoHandler {
    pub fn new(review_use_case: Arc<ReviewTransacoesUseCase>) -> Self {
        Self { review_use_case }
    }

    pub async fn list_transacoes(
        State(handler): State<Arc<TransacaoHandler>>,
        Query(query): Query<TransacaoListQuery>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.review_use_case.list(query.into()).await {
            Ok(page) => Ok(success_response(
                StatusCode::OK,
                TransacaoListResponseDto::from(page),
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn summary(
        State(handler): State<Arc<TransacaoHandler>>,
        Query(query): Query<SummaryQuery>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.review_use_case.summary(query.processo_id).await {
            Ok(summary) => Ok(success_response(
                StatusCode::OK,
                TransacaoSummaryDto::from(summary),
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn get_transacao(
        State(handler): State<Arc<TransacaoHandler>>,
        Path(transacao_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.review_use_case.get(transacao_id).await {
            Ok(transacao) => Ok(success_response(
                StatusCode::OK,
                TransacaoResponseDto::from(transacao),
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn update_transacao(
        State(handler): State<Arc<TransacaoHandler>>,
        Path(transacao_id): Path<Uuid>,
        Json(payload): Json<UpdateTransacaoDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler
            .review_use_case
            .update(transacao_id, payload.into())
            .await
        {
            Ok(transacao) => Ok(success_response(
                StatusCode::OK,
                TransacaoResponseDto::from(transacao),
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn confirm_transacao(
        State(handler): State<Arc<TransacaoHandler>>,
        Path(transacao_id): Path<Uuid>,
        Json(payload): Json<ConfirmTransacaoDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler
            .review_use_case
            .confirm(transacao_id, payload.user_id)
            .await
        {
            Ok(transacao) => Ok(success_response(
                StatusCode::OK,
                TransacaoResponseDto::from(transacao),
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }
}

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::use_cases::ManageProcessosUseCase;
use crate::presentation::http::dto::{
    CreateProcessoDto, MessageResponseDto, ProcessoListQuery, ProcessoResponseDto,
    UpdateProcessoDto, error_response, success_response,
};

pub struct ProcessoHandler {
    processos_use_case: Arc<ManageProcessosUseCase>,
}

impl ProcessoHandler {
    pub fn new(processos_use_case: Arc<ManageProcessosUseCase>) -> Self {
        Self { processos_use_case }
    }

    pub async fn create_processo(
        State(handler): State<Arc<ProcessoHandler>>,
        Json(payload): Json<CreateProcessoDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.processos_use_case.create(payload.into()).await {
            Ok(processo) => Ok(success_response(
                StatusCode::CREATED,
                ProcessoResponseDto::from(processo),
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn list_processos(
        State(handler): State<Arc<ProcessoHandler>>,
        Query(query): Query<ProcessoListQuery>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.processos_use_case.list(query.owner_id).await {
            Ok(processos) => {
                let dtos: Vec<ProcessoResponseDto> =
                    processos.into_iter().map(ProcessoResponseDto::from).collect();
                Ok(success_response(StatusCode::OK, dtos))
            }
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn get_processo(
        State(handler): State<Arc<ProcessoHandler>>,
        Path(processo_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.processos_use_case.get(processo_id).await {
            Ok(details) => Ok(success_response(
                StatusCode::OK,
                ProcessoResponseDto::from(details),
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn update_processo(
        State(handler): State<Arc<ProcessoHandler>>,
        Path(processo_id): Path<Uuid>,
        Json(payload): Json<UpdateProcessoDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler
            .processos_use_case
            .update(processo_id, payload.into())
            .await
        {
            Ok(details) => Ok(success_response(
                StatusCode::OK,
                ProcessoResponseDto::from(details),
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn delete_processo(
        State(handler): State<Arc<ProcessoHandler>>,
        Path(processo_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.processos_use_case.delete(processo_id).await {
            Ok(()) => Ok(success_response(
                StatusCode::OK,
                MessageResponseDto {
                    message: format!("Processo {} deleted", processo_id),
                },
            )),
            Err(e) => Ok(error_response(&e)),
        }
    }
}

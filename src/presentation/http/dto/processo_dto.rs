use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::use_cases::{CreateProcessoRequest, ProcessoDetails};
use crate::domain::entities::{Processo, ProcessoChanges};

#[derive(Debug, Deserialize)]
pub struct CreateProcessoDto {
    pub owner_id: Uuid,
    pub numero: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub context: Option<String>,
}

impl From<CreateProcessoDto> for CreateProcessoRequest {
    fn from(dto: CreateProcessoDto) -> Self {
        Self {
            owner_id: dto.owner_id,
            numero: dto.numero,
            title: dto.title,
            description: dto.description,
            context: dto.context,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProcessoDto {
    pub numero: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub context: Option<String>,
    pub status: Option<String>,
}

impl From<UpdateProcessoDto> for ProcessoChanges {
    fn from(dto: UpdateProcessoDto) -> Self {
        Self {
            numero: dto.numero,
            title: dto.title,
            description: dto.description,
            context: dto.context,
            status: dto.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProcessoListQuery {
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ProcessoResponseDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub numero: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub context: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Processo> for ProcessoResponseDto {
    fn from(processo: Processo) -> Self {
        Self {
            id: processo.id,
            owner_id: processo.owner_id,
            numero: processo.numero,
            title: processo.title,
            description: processo.description,
            context: processo.context,
            status: processo.status,
            document_count: None,
            created_at: processo.created_at,
            updated_at: processo.updated_at,
        }
    }
}

impl From<ProcessoDetails> for ProcessoResponseDto {
    fn from(details: ProcessoDetails) -> Self {
        Self {
            document_count: Some(details.document_count),
            ..Self::from(details.processo)
        }
    }
}

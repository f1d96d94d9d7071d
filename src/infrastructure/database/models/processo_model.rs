use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Processo;
use crate::infrastructure::database::schema::processos;

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Identifiable)]
#[diesel(table_name = processos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProcessoModel {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub numero: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub context: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Processo> for ProcessoModel {
    fn from(processo: &Processo) -> Self {
        Self {
            id: processo.id,
            owner_id: processo.owner_id,
            numero: processo.numero.clone(),
            title: processo.title.clone(),
            description: processo.description.clone(),
            context: processo.context.clone(),
            status: processo.status.clone(),
            created_at: processo.created_at,
            updated_at: processo.updated_at,
        }
    }
}

impl From<ProcessoModel> for Processo {
    fn from(model: ProcessoModel) -> Self {
        Processo {
            id: model.id,
            owner_id: model.owner_id,
            numero: model.numero,
            title: model.title,
            description: model.description,
            context: model.context,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

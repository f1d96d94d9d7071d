use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Processo;
use crate::domain::repositories::{ProcessoRepository, RepositoryError};
use crate::infrastructure::database::models::ProcessoModel;
use crate::infrastructure::database::schema::{documents, processos};
use crate::infrastructure::database::{DbPool, with_connection};

pub struct PostgresProcessoRepository {
    pool: DbPool,
}

impl PostgresProcessoRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcessoRepository for PostgresProcessoRepository {
    async fn save(&self, processo: &Processo) -> Result<(), RepositoryError> {
        let model = ProcessoModel::from(processo);

        with_connection(&self.pool, move |conn| {
            diesel::insert_into(processos::table)
                .values(&model)
                .execute(conn)
                .map(|_| ())
        })
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Processo>, RepositoryError> {
        let model = with_connection(&self.pool, move |conn| {
            processos::table
                .find(id)
                .select(ProcessoModel::as_select())
                .first(conn)
                .optional()
        })
        .await?;

        Ok(model.map(Processo::from))
    }

    async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<Processo>, RepositoryError> {
        let models = with_connection(&self.pool, move |conn| {
            let mut query = processos::table
                .select(ProcessoModel::as_select())
                .order(processos::created_at.desc())
                .into_boxed();
            if let Some(owner) = owner_id {
                query = query.filter(processos::owner_id.eq(owner));
            }
            query.load(conn)
        })
        .await?;

        Ok(models.into_iter().map(Processo::from).collect())
    }

    async fn update(&self, processo: &Processo) -> Result<(), RepositoryError> {
        let id = processo.id;
        let numero = processo.numero.clone();
        let title = processo.title.clone();
        let description = processo.description.clone();
        let context = processo.context.clone();
        let status = processo.status.clone();
        let updated_at = processo.updated_at;

        let updated = with_connection(&self.pool, move |conn| {
            diesel::update(processos::table.find(id))
                .set((
                    processos::numero.eq(numero),
                    processos::title.eq(title),
                    processos::description.eq(description),
                    processos::context.eq(context),
                    processos::status.eq(status),
                    processos::updated_at.eq(updated_at),
                ))
                .execute(conn)
        })
        .await?;

        if updated == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    async fn count_documents(&self, id: Uuid) -> Result<i64, RepositoryError> {
        with_connection(&self.pool, move |conn| {
            documents::table
                .filter(documents::processo_id.eq(id))
                .count()
                .get_result(conn)
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let deleted = with_connection(&self.pool, move |conn| {
            diesel::delete(processos::table.find(id)).execute(conn)
        })
        .await?;

        Ok(deleted > 0)
    }
}

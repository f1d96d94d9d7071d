use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text, Uuid as SqlUuid};
use uuid::Uuid;

use crate::domain::entities::{Transacao, TransacaoSummary, TransacaoTotal};
use crate::domain::repositories::{
    RepositoryError, TransacaoFilter, TransacaoReportFilter, TransacaoRepository,
};
use crate::infrastructure::database::models::TransacaoModel;
use crate::infrastructure::database::schema::transacoes;
use crate::infrastructure::database::{DbPool, with_connection};

// SUM over BIGINT yields NUMERIC, cast back to keep plain integers.
const SUMMARY_BY_CATEGORY_SQL: &str = "\
SELECT category AS key, COALESCE(SUM(amount_cents), 0)::bigint AS total_cents, COUNT(*) AS count \
FROM transacoes WHERE processo_id = $1 GROUP BY category ORDER BY total_cents DESC";

const SUMMARY_BY_PAYER_SQL: &str = "\
SELECT payer AS key, COALESCE(SUM(amount_cents), 0)::bigint AS total_cents, COUNT(*) AS count \
FROM transacoes WHERE processo_id = $1 GROUP BY payer ORDER BY total_cents DESC";

const SUMMARY_TOTAL_SQL: &str = "\
SELECT NULL::text AS key, COALESCE(SUM(amount_cents), 0)::bigint AS total_cents, COUNT(*) AS count \
FROM transacoes WHERE processo_id = $1";

#[derive(QueryableByName)]
struct TotalRow {
    #[diesel(sql_type = Nullable<Text>)]
    key: Option<String>,
    #[diesel(sql_type = BigInt)]
    total_cents: i64,
    #[diesel(sql_type = BigInt)]
    count: i64,
}

impl From<TotalRow> for TransacaoTotal {
    fn from(row: TotalRow) -> Self {
        TransacaoTotal {
            key: row.key,
            total_cents: row.total_cents,
            count: row.count,
        }
    }
}

pub struct PostgresTransacaoRepository {
    pool: DbPool,
}

impl PostgresTransacaoRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransacaoRepository for PostgresTransacaoRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transacao>, RepositoryError> {
        let model = with_connection(&self.pool, move |conn| {
            transacoes::table
                .find(id)
                .select(TransacaoModel::as_select())
                .first(conn)
                .optional()
        })
        .await?;

        Ok(model.map(Transacao::from))
    }

    async fn list(&self, filter: &TransacaoFilter) -> Result<(Vec<Transacao>, i64), RepositoryError> {
        let filter = filter.clone();

        let (models, total) = with_connection(&self.pool, move |conn| {
            let build = || {
                let mut query = transacoes::table
                    .filter(transacoes::processo_id.eq(filter.processo_id))
                    .into_boxed();
                if let Some(category) = filter.category {
                    query = query.filter(transacoes::category.eq(category.as_str()));
                }
                if let Some(payer) = filter.payer.clone() {
                    query = query.filter(transacoes::payer.eq(payer));
                }
                if let Some(reviewed) = filter.reviewed {
                    query = query.filter(transacoes::reviewed.eq(reviewed));
                }
                query
            };

            let total: i64 = build().count().get_result(conn)?;
            let models = build()
                .select(TransacaoModel::as_select())
                .order((
                    transacoes::date.desc().nulls_last(),
                    transacoes::created_at.desc(),
                ))
                .offset(filter.skip)
                .limit(filter.limit)
                .load(conn)?;
            Ok((models, total))
        })
        .await?;

        Ok((models.into_iter().map(Transacao::from).collect(), total))
    }

    async fn find_for_report(&self, filter: &TransacaoReportFilter) -> Result<Vec<Transacao>, RepositoryError> {
        let filter = filter.clone();

        let models = with_connection(&self.pool, move |conn| {
            let mut query = transacoes::table
                .filter(transacoes::processo_id.eq(filter.processo_id))
                .select(TransacaoModel::as_select())
                .into_boxed();
            if let Some(from) = filter.date_from {
                query = query.filter(transacoes::date.ge(from));
            }
            if let Some(to) = filter.date_to {
                query = query.filter(transacoes::date.le(to));
            }
            if !filter.categories.is_empty() {
                let categories: Vec<&str> = filter.categories.iter().map(|c| c.as_str()).collect();
                query = query.filter(transacoes::category.eq_any(categories));
            }
            if !filter.payers.is_empty() {
                query = query.filter(transacoes::payer.eq_any(filter.payers.clone()));
            }

            query
                .order((
                    transacoes::date.desc().nulls_last(),
                    transacoes::created_at.desc(),
                ))
                .load(conn)
        })
        .await?;

        Ok(models.into_iter().map(Transacao::from).collect())
    }

    async fn summary(&self, processo_id: Uuid) -> Result<TransacaoSummary, RepositoryError> {
        with_connection(&self.pool, move |conn| {
            let by_category: Vec<TotalRow> = diesel::sql_query(SUMMARY_BY_CATEGORY_SQL)
                .bind::<SqlUuid, _>(processo_id)
                .load(conn)?;
            let by_payer: Vec<TotalRow> = diesel::sql_query(SUMMARY_BY_PAYER_SQL)
                .bind::<SqlUuid, _>(processo_id)
                .load(conn)?;
            let overall: TotalRow = diesel::sql_query(SUMMARY_TOTAL_SQL)
                .bind::<SqlUuid, _>(processo_id)
                .get_result(conn)?;

            Ok(TransacaoSummary {
                by_category: by_category.into_iter().map(TransacaoTotal::from).collect(),
                by_payer: by_payer.into_iter().map(TransacaoTotal::from).collect(),
                total_cents: overall.total_cents,
                total_count: overall.count,
            })
        })
        .await
    }

    async fn update(&self, transacao: &Transacao) -> Result<(), RepositoryError> {
        let id = transacao.id;
        let mut model = TransacaoModel::from(transacao);
        model.updated_at = Utc::now();

        let updated = with_connection(&self.pool, move |conn| {
            diesel::update(transacoes::table.find(id))
                .set(&model)
                .execute(conn)
        })
        .await?;

        if updated == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    async fn replace_unreviewed_for_document(
        &self,
        document_id: Uuid,
        batch: &[Transacao],
    ) -> Result<i64, RepositoryError> {
        let models: Vec<TransacaoModel> = batch.iter().map(TransacaoModel::from).collect();

        let deleted = with_connection(&self.pool, move |conn| {
            conn.transaction(|conn| {
                let deleted = diesel::delete(
                    transacoes::table
                        .filter(transacoes::reviewed.eq(false))
                        .filter(transacoes::source_document_ids.contains(vec![document_id])),
                )
                .execute(conn)?;

                if !models.is_empty() {
                    diesel::insert_into(transacoes::table)
                        .values(&models)
                        .execute(conn)?;
                }
                Ok(deleted)
            })
        })
        .await?;

        Ok(deleted as i64)
    }
}

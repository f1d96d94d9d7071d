use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_types::{Array, BigInt, Date, Double, Int4, Nullable, Text, Uuid as SqlUuid};
use uuid::Uuid;

use crate::domain::entities::{Chunk, RetrievedChunk};
use crate::domain::repositories::{ChunkRepository, RepositoryError, SimilarityQuery};
use crate::infrastructure::database::models::{ChunkModel, NewChunkModel};
use crate::infrastructure::database::schema::chunks;
use crate::infrastructure::database::{DbPool, with_connection};

// Postgres caps bind parameters per statement.
const INSERT_BATCH_SIZE: usize = 1000;

const SIMILARITY_SQL: &str = "\
SELECT c.id AS chunk_id, c.content, c.position, c.document_id, \
       d.title AS doc_title, d.kind AS doc_kind, d.participants, d.reference_date, \
       1 - (c.embedding <=> $1) AS similarity \
FROM chunks c \
JOIN documents d ON d.id = c.document_id \
WHERE d.status = 'processed' \
  AND c.embedding IS NOT NULL \
  AND ($2::uuid IS NULL OR d.processo_id = $2) \
ORDER BY c.embedding <=> $1 \
LIMIT $3";

#[derive(QueryableByName)]
struct SimilarityRow {
    #[diesel(sql_type = SqlUuid)]
    chunk_id: Uuid,
    #[diesel(sql_type = Text)]
    content: String,
    #[diesel(sql_type = Int4)]
    position: i32,
    #[diesel(sql_type = SqlUuid)]
    document_id: Uuid,
    #[diesel(sql_type = Text)]
    doc_title: String,
    #[diesel(sql_type = Text)]
    doc_kind: String,
    #[diesel(sql_type = Nullable<Array<Text>>)]
    participants: Option<Vec<String>>,
    #[diesel(sql_type = Nullable<Date>)]
    reference_date: Option<NaiveDate>,
    #[diesel(sql_type = Double)]
    similarity: f64,
}

impl From<SimilarityRow> for RetrievedChunk {
    fn from(row: SimilarityRow) -> Self {
        RetrievedChunk {
            chunk_id: row.chunk_id,
            content: row.content,
            position: row.position,
            document_id: row.document_id,
            doc_title: row.doc_title,
            doc_kind: row.doc_kind,
            participants: row.participants.unwrap_or_default(),
            reference_date: row.reference_date,
            similarity: row.similarity as f32,
        }
    }
}

pub struct PostgresChunkRepository {
    pool: DbPool,
}

impl PostgresChunkRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChunkRepository for PostgresChunkRepository {
    async fn replace_for_document(
        &self,
        document_id: Uuid,
        new_chunks: &[Chunk],
    ) -> Result<(), RepositoryError> {
        let models: Vec<NewChunkModel> = new_chunks.iter().map(NewChunkModel::from).collect();

        with_connection(&self.pool, move |conn| {
            conn.transaction(|conn| {
                diesel::delete(chunks::table.filter(chunks::document_id.eq(document_id)))
                    .execute(conn)?;
                for batch in models.chunks(INSERT_BATCH_SIZE) {
                    diesel::insert_into(chunks::table)
                        .values(batch)
                        .execute(conn)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn find_by_document(&self, document_id: Uuid) -> Result<Vec<Chunk>, RepositoryError> {
        let models = with_connection(&self.pool, move |conn| {
            chunks::table
                .filter(chunks::document_id.eq(document_id))
                .order(chunks::position.asc())
                .select(ChunkModel::as_select())
                .load(conn)
        })
        .await?;

        Ok(models.into_iter().map(Chunk::from).collect())
    }

    async fn count_by_document(&self, document_id: Uuid) -> Result<i64, RepositoryError> {
        with_connection(&self.pool, move |conn| {
            chunks::table
                .filter(chunks::document_id.eq(document_id))
                .count()
                .get_result(conn)
        })
        .await
    }

    async fn similarity_search(
        &self,
        query: &SimilarityQuery,
    ) -> Result<Vec<RetrievedChunk>, RepositoryError> {
        let vector = query.vector.clone();
        let processo_id = query.processo_id;
        let limit = query.limit;

        let rows: Vec<SimilarityRow> = with_connection(&self.pool, move |conn| {
            diesel::sql_query(SIMILARITY_SQL)
                .bind::<pgvector::sql_types::Vector, _>(vector)
                .bind::<Nullable<SqlUuid>, _>(processo_id)
                .bind::<BigInt, _>(limit)
                .load(conn)
        })
        .await?;

        let threshold = query.threshold.unwrap_or(f32::MIN);
        Ok(rows
            .into_iter()
            .map(RetrievedChunk::from)
            .filter(|chunk| chunk.similarity >= threshold)
            .collect())
    }
}

use {async_trait::async_trait, sqlx::SqlitePool, tracing::warn};

use crate::{
    error::Result,
    schema::{Embedding, EmbeddingRow},
    store::EmbeddingStore,
};

const SELECT_COLUMNS: &str =
    "SELECT slug, content_hash, model_name, model_version, dimensions, vector, created_at FROM embeddings";

/// [`EmbeddingStore`] backed by the `embeddings` table of a SQLite pool.
#[derive(Clone)]
pub struct SqliteEmbeddingStore {
    pool: SqlitePool,
}

impl SqliteEmbeddingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl EmbeddingStore for SqliteEmbeddingStore {
    async fn get(&self, slug: &str) -> Result<Option<Embedding>> {
        let row: Option<EmbeddingRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE slug = ?"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Embedding::try_from_row).transpose()
    }

    async fn upsert(&self, embedding: &Embedding) -> Result<()> {
        let row = embedding.clone().into_row();
        sqlx::query(
            "INSERT INTO embeddings (slug, content_hash, model_name, model_version, dimensions, vector, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(slug) DO UPDATE SET
               content_hash = excluded.content_hash,
               model_name = excluded.model_name,
               model_version = excluded.model_version,
               dimensions = excluded.dimensions,
               vector = excluded.vector,
               created_at = excluded.created_at",
        )
        .bind(&row.slug)
        .bind(&row.content_hash)
        .bind(&row.model_name)
        .bind(&row.model_version)
        .bind(row.dimensions)
        .bind(&row.vector)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, slug: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM embeddings WHERE slug = ?")
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<Embedding>> {
        let rows: Vec<EmbeddingRow> = sqlx::query_as(SELECT_COLUMNS)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match Embedding::try_from_row(row) {
                Ok(embedding) => Some(embedding),
                Err(e) => {
                    warn!(error = %e, "skipping corrupt embedding row");
                    None
                },
            })
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM embeddings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

/// Single-connection in-memory pool with the schema applied.
///
/// One connection only: every `sqlite::memory:` connection is its own database.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) async fn memory_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    crate::schema::run_migrations(&pool)
        .await
        .expect("run migrations");
    pool
}

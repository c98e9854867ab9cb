//! Embedding table schema and the row ↔ record translation.

use {
    chrono::{DateTime, Utc},
    serde::Serialize,
    sqlx::SqlitePool,
};

use crate::{
    codec::{bytes_to_vector, decoded_len, vector_to_bytes},
    error::{Error, Result},
};

const CREATE_EMBEDDINGS: &str = "\
CREATE TABLE IF NOT EXISTS embeddings (
    slug          TEXT PRIMARY KEY NOT NULL,
    content_hash  TEXT NOT NULL,
    model_name    TEXT NOT NULL,
    model_version TEXT NOT NULL,
    dimensions    INTEGER NOT NULL,
    vector        BLOB NOT NULL,
    created_at    INTEGER NOT NULL
)";

const CREATE_INDEXES: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_embeddings_content_hash ON embeddings (slug, content_hash)",
    "CREATE INDEX IF NOT EXISTS idx_embeddings_model ON embeddings (model_name, model_version)",
];

/// Create the `embeddings` table and its indexes. Safe to run repeatedly.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_EMBEDDINGS).execute(pool).await?;
    for stmt in CREATE_INDEXES {
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}

/// Row as stored in SQLite.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmbeddingRow {
    pub slug: String,
    pub content_hash: String,
    pub model_name: String,
    pub model_version: String,
    pub dimensions: i64,
    pub vector: Vec<u8>,
    /// Unix seconds.
    pub created_at: i64,
}

/// A cached embedding for one memory slug.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embedding {
    pub slug: String,
    pub content_hash: String,
    pub model_name: String,
    pub model_version: String,
    pub dimensions: usize,
    #[serde(skip)]
    pub vector: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

impl Embedding {
    /// Build a record stamped with the current time. `dimensions` is taken
    /// from the vector so the two can never disagree.
    pub fn new(
        slug: impl Into<String>,
        content_hash: impl Into<String>,
        model_name: impl Into<String>,
        model_version: impl Into<String>,
        vector: Vec<f32>,
    ) -> Self {
        Self {
            slug: slug.into(),
            content_hash: content_hash.into(),
            model_name: model_name.into(),
            model_version: model_version.into(),
            dimensions: vector.len(),
            vector,
            // Second precision, matching what the store keeps.
            created_at: DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap_or_default(),
        }
    }

    /// Fresh iff the fingerprint and the model version both match.
    pub fn is_fresh(&self, content_hash: &str, model_version: &str) -> bool {
        self.content_hash == content_hash && self.model_version == model_version
    }

    pub fn into_row(self) -> EmbeddingRow {
        EmbeddingRow {
            vector: vector_to_bytes(&self.vector),
            slug: self.slug,
            content_hash: self.content_hash,
            model_name: self.model_name,
            model_version: self.model_version,
            dimensions: self.dimensions as i64,
            created_at: self.created_at.timestamp(),
        }
    }

    pub fn try_from_row(row: EmbeddingRow) -> Result<Self> {
        let decoded = decoded_len(row.vector.len());
        if usize::try_from(row.dimensions).ok() != Some(decoded) {
            return Err(Error::CorruptRecord {
                slug: row.slug,
                dimensions: row.dimensions,
                decoded,
            });
        }
        Ok(Self {
            vector: bytes_to_vector(&row.vector),
            dimensions: decoded,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
            slug: row.slug,
            content_hash: row.content_hash,
            model_name: row.model_name,
            model_version: row.model_version,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_translation_roundtrip() {
        let emb = Embedding::new("a", "h", "m", "v1", vec![0.5, -0.25, 1.0]);
        let row = emb.clone().into_row();
        assert_eq!(row.dimensions, 3);
        assert_eq!(row.vector.len(), 12);
        let back = Embedding::try_from_row(row).unwrap();
        assert_eq!(back, emb);
    }

    #[test]
    fn test_row_with_mismatched_dimensions_is_rejected() {
        let mut row = Embedding::new("a", "h", "m", "v1", vec![1.0, 2.0]).into_row();
        row.dimensions = 3;
        let err = Embedding::try_from_row(row).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptRecord {
                dimensions: 3,
                decoded: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_is_fresh_requires_hash_and_version() {
        let emb = Embedding::new("a", "h1", "m", "v1", vec![1.0]);
        assert!(emb.is_fresh("h1", "v1"));
        assert!(!emb.is_fresh("h2", "v1"));
        assert!(!emb.is_fresh("h1", "v2"));
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = crate::store_sqlite::memory_pool().await;
        run_migrations(&pool).await.unwrap();
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_embeddings_%'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 2);
    }
}

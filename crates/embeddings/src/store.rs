use async_trait::async_trait;

use crate::{error::Result, schema::Embedding};

/// Durable storage for embedding records, keyed by slug.
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    async fn get(&self, slug: &str) -> Result<Option<Embedding>>;

    /// Insert or fully overwrite the record for `embedding.slug`.
    async fn upsert(&self, embedding: &Embedding) -> Result<()>;

    /// Returns `true` if a record was removed.
    async fn delete(&self, slug: &str) -> Result<bool>;

    /// Every decodable record. Rows whose blob disagrees with their stored
    /// dimensions are logged and left out rather than failing the scan.
    async fn list_all(&self) -> Result<Vec<Embedding>>;

    async fn count(&self) -> Result<u64>;
}

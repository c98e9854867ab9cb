/// Errors surfaced by the embedding cache and search engine.
///
/// "Nothing cached" is never an error: lookups return `Ok(None)` and deletes
/// return `Ok(false)` instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The embedding provider failed (timeout, bad response, upstream error).
    #[error("failed to generate embedding: {0}")]
    Provider(#[source] anyhow::Error),

    /// The relational store rejected the operation or is unreachable.
    #[error("embedding store error: {0}")]
    Storage(#[from] sqlx::Error),

    /// A stored row whose `dimensions` column disagrees with its vector blob.
    #[error("corrupt embedding for {slug}: dimensions={dimensions} but blob decodes to {decoded}")]
    CorruptRecord {
        slug: String,
        dimensions: i64,
        decoded: usize,
    },
}

impl Error {
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

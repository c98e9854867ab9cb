//! Embedding cache: content → fingerprint → cached vector in SQLite, with
//! cosine similarity search and keyword-boosted hybrid ranking on top.

pub mod cache;
pub mod codec;
pub mod config;
pub mod embeddings;
pub mod embeddings_openai;
pub mod error;
pub mod hash;
pub mod hybrid;
pub mod schema;
pub mod search;
pub mod semantic;
pub mod store;
pub mod store_sqlite;

pub use {
    cache::{EmbeddingCache, IndexReport, MemoryContent},
    config::EmbeddingsConfig,
    embeddings::EmbeddingProvider,
    error::{Error, Result},
    schema::{Embedding, run_migrations},
    search::{DEFAULT_SEARCH_LIMIT, SearchResult, VectorSearch, cosine_similarity},
    semantic::SemanticSearch,
    store::EmbeddingStore,
    store_sqlite::SqliteEmbeddingStore,
};

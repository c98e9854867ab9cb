//! Text-query search: embeds the query with the cache's provider, then ranks.

use std::{collections::HashSet, sync::Arc};

use tracing::debug;

use crate::{
    cache::EmbeddingCache,
    error::{Error, Result},
    search::{SearchResult, VectorSearch},
};

pub struct SemanticSearch {
    cache: Arc<EmbeddingCache>,
    search: VectorSearch,
}

impl SemanticSearch {
    pub fn new(cache: Arc<EmbeddingCache>, search: VectorSearch) -> Self {
        Self { cache, search }
    }

    /// Query vector, or `None` when embeddings are disabled.
    async fn embed_query(&self, query: &str) -> Result<Option<Vec<f32>>> {
        if !self.cache.is_enabled() {
            debug!("embeddings disabled, semantic search returns nothing");
            return Ok(None);
        }
        let vector = self
            .cache
            .embedder()
            .embed(query)
            .await
            .map_err(Error::Provider)?;
        Ok(Some(vector))
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        match self.embed_query(query).await? {
            Some(v) => self.search.search(&v, limit).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn search_with_threshold(
        &self,
        query: &str,
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        match self.embed_query(query).await? {
            Some(v) => self.search.search_with_threshold(&v, threshold, limit).await,
            None => Ok(Vec::new()),
        }
    }

    /// Semantic ranking boosted by slugs that matched the query by keyword.
    pub async fn hybrid_search(
        &self,
        query: &str,
        keyword_matches: &[String],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let Some(v) = self.embed_query(query).await? else {
            return Ok(Vec::new());
        };
        let keywords: HashSet<String> = keyword_matches.iter().cloned().collect();
        self.search.hybrid_search(&v, &keywords, limit).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::{
            cache::{MemoryContent, test_support::MockEmbedder},
            config::EmbeddingsConfig,
            store_sqlite::{SqliteEmbeddingStore, memory_pool},
        },
    };

    async fn setup() -> (SemanticSearch, Arc<EmbeddingCache>, Arc<MockEmbedder>) {
        let store = Arc::new(SqliteEmbeddingStore::new(memory_pool().await));
        let embedder = Arc::new(MockEmbedder::default());
        let cache = Arc::new(EmbeddingCache::new(
            &EmbeddingsConfig::default().with_model("mock-model", "v1"),
            store.clone(),
            embedder.clone(),
        ));
        let semantic = SemanticSearch::new(cache.clone(), VectorSearch::new(store));
        (semantic, cache, embedder)
    }

    async fn seed(cache: &EmbeddingCache) {
        let report = cache
            .index_all(&[
                MemoryContent::new("rust-notes", "Rust ownership and the borrow checker"),
                MemoryContent::new("db-notes", "SQLite database tuning"),
                MemoryContent::new("recipes", "cooking pasta with garlic"),
                MemoryContent::new("rust-db", "a rust database driver"),
            ])
            .await;
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_text_search_ranks_by_topic() {
        let (semantic, cache, _) = setup().await;
        seed(&cache).await;

        let results = semantic.search("rust", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].slug, "rust-notes");
        assert_eq!(results[1].slug, "rust-db");

        let results = semantic.search("cooking", 1).await.unwrap();
        assert_eq!(results[0].slug, "recipes");
    }

    #[tokio::test]
    async fn test_text_search_with_threshold() {
        let (semantic, cache, _) = setup().await;
        seed(&cache).await;

        let results = semantic
            .search_with_threshold("rust database", 0.7, 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].slug, "rust-db");
        assert!(results.iter().all(|r| r.similarity >= 0.7));
    }

    #[tokio::test]
    async fn test_text_hybrid_search_boosts_keyword_hit() {
        let (semantic, cache, _) = setup().await;
        seed(&cache).await;

        // "rust database" scores rust-db at 1.0 and the other two at ~0.707.
        let results = semantic
            .hybrid_search("rust database", &["db-notes".to_string()], 2)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].slug, "db-notes");
        assert!(results.iter().all(|r| r.similarity <= 1.0));
    }

    #[tokio::test]
    async fn test_disabled_search_returns_empty_without_provider_call() {
        let (semantic, cache, embedder) = setup().await;
        seed(&cache).await;
        let calls = embedder.calls();
        cache.set_enabled(false);

        assert!(semantic.search("rust", 5).await.unwrap().is_empty());
        assert!(
            semantic
                .search_with_threshold("rust", 0.1, 5)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(semantic.hybrid_search("rust", &[], 5).await.unwrap().is_empty());
        assert_eq!(embedder.calls(), calls);
    }

    #[tokio::test]
    async fn test_provider_failure_on_query_propagates() {
        let (semantic, _, _) = setup().await;
        let err = semantic.search("poison query", 5).await.unwrap_err();
        assert!(err.is_provider());
    }
}

/// Embedding cache: lazily regenerates vectors when content or model version changes.
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

#[cfg(feature = "metrics")]
use metrics::counter;
use tracing::{debug, info, warn};

use crate::{
    config::EmbeddingsConfig,
    embeddings::EmbeddingProvider,
    error::{Error, Result},
    hash::content_hash,
    schema::Embedding,
    store::EmbeddingStore,
};

pub struct EmbeddingCache {
    store: Arc<dyn EmbeddingStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    model_name: String,
    model_version: String,
    enabled: AtomicBool,
}

/// A memory slug with the content to embed.
#[derive(Debug, Clone)]
pub struct MemoryContent {
    pub slug: String,
    pub content: String,
}

impl MemoryContent {
    pub fn new(slug: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            content: content.into(),
        }
    }
}

/// Outcome of a batch [`EmbeddingCache::index_all`] run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub indexed: usize,
    pub failed: usize,
}

impl EmbeddingCache {
    pub fn new(
        config: &EmbeddingsConfig,
        store: Arc<dyn EmbeddingStore>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            store,
            embedder,
            model_name: config.model_name.clone(),
            model_version: config.model_version.clone(),
            enabled: AtomicBool::new(config.enabled),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    pub(crate) fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    /// Return the vector for `slug`, regenerating it if the cached one is stale.
    ///
    /// Returns an empty vector when the cache is disabled; that means "no
    /// embedding available", not a zero vector. Concurrent calls for the same
    /// stale slug may each call the provider; the last write wins.
    pub async fn get_embedding(&self, slug: &str, content: &str) -> Result<Vec<f32>> {
        if !self.is_enabled() {
            return Ok(Vec::new());
        }

        let hash = content_hash(content);
        if let Some(cached) = self.lookup_for_freshness(slug).await?
            && cached.is_fresh(&hash, &self.model_version)
        {
            debug!(slug, "embedding cache hit");
            #[cfg(feature = "metrics")]
            counter!("mnemo_embedding_cache_hits_total").increment(1);
            return Ok(cached.vector);
        }

        debug!(slug, model = self.embedder.provider_key(), "embedding cache miss, regenerating");
        #[cfg(feature = "metrics")]
        counter!("mnemo_embedding_cache_misses_total").increment(1);

        let vector = self.embedder.embed(content).await.map_err(Error::Provider)?;
        let record = Embedding::new(
            slug,
            hash,
            self.model_name.as_str(),
            self.model_version.as_str(),
            vector,
        );
        self.store.upsert(&record).await?;

        #[cfg(feature = "metrics")]
        counter!("mnemo_embeddings_generated_total").increment(1);

        Ok(record.vector)
    }

    /// Read-only lookup. Never contacts the provider.
    pub async fn get_cached_embedding(&self, slug: &str) -> Result<Option<Embedding>> {
        self.store.get(slug).await
    }

    /// True when nothing is cached for `slug`, or the cached vector was built
    /// from different content or a different model version.
    pub async fn is_stale(&self, slug: &str, content: &str) -> Result<bool> {
        let Some(cached) = self.lookup_for_freshness(slug).await? else {
            return Ok(true);
        };
        Ok(!cached.is_fresh(&content_hash(content), &self.model_version))
    }

    /// Cached record for a freshness check. A corrupt row counts as missing,
    /// so the next regeneration overwrites it.
    async fn lookup_for_freshness(&self, slug: &str) -> Result<Option<Embedding>> {
        match self.store.get(slug).await {
            Err(e @ Error::CorruptRecord { .. }) => {
                warn!(slug, error = %e, "corrupt cached embedding, treating as stale");
                Ok(None)
            },
            other => other,
        }
    }

    /// Stored fingerprint for `slug`, if any.
    pub async fn content_hash_of(&self, slug: &str) -> Result<Option<String>> {
        Ok(self.store.get(slug).await?.map(|e| e.content_hash))
    }

    /// Evict the cached vector for `slug`. Returns `false` if nothing was cached;
    /// evicting an absent slug is not an error.
    pub async fn delete_embedding(&self, slug: &str) -> Result<bool> {
        let removed = self.store.delete(slug).await?;
        if removed {
            debug!(slug, "evicted embedding");
        }
        Ok(removed)
    }

    /// Best-effort reindex: each item goes through [`get_embedding`](Self::get_embedding),
    /// failures are logged and counted, and the batch always runs to the end.
    pub async fn index_all(&self, items: &[MemoryContent]) -> IndexReport {
        let mut report = IndexReport::default();
        if !self.is_enabled() {
            debug!(items = items.len(), "embeddings disabled, skipping index");
            return report;
        }

        for item in items {
            match self.get_embedding(&item.slug, &item.content).await {
                Ok(_) => report.indexed += 1,
                Err(e) => {
                    warn!(slug = %item.slug, error = %e, "failed to index embedding");
                    report.failed += 1;
                },
            }
        }

        info!(
            indexed = report.indexed,
            failed = report.failed,
            "embedding index complete"
        );
        report
    }

    pub async fn count_embeddings(&self) -> Result<u64> {
        self.store.count().await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use {
        crate::embeddings::EmbeddingProvider,
        async_trait::async_trait,
        std::sync::atomic::{AtomicUsize, Ordering},
    };

    /// Deterministic embedder: one dimension per keyword, 1.0 when the text
    /// mentions it. Counts calls and fails on any text containing "poison".
    #[derive(Default)]
    pub struct MockEmbedder {
        calls: AtomicUsize,
    }

    pub const KEYWORDS: [&str; 8] = [
        "rust", "python", "database", "memory", "search", "network", "cooking", "music",
    ];

    pub fn keyword_embedding(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        KEYWORDS
            .iter()
            .map(|kw| if lower.contains(kw) { 1.0 } else { 0.0 })
            .collect()
    }

    impl MockEmbedder {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbedder {
        async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.contains("poison") {
                anyhow::bail!("provider rejected input");
            }
            Ok(keyword_embedding(text))
        }

        fn model_name(&self) -> &str {
            "mock-model"
        }

        fn dimensions(&self) -> usize {
            KEYWORDS.len()
        }
    }
}

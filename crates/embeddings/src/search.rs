//! Linear-scan cosine similarity over every cached vector.

use std::{cmp::Ordering, sync::Arc};

use {serde::Serialize, tracing::debug};

use crate::{error::Result, schema::Embedding, store::EmbeddingStore};

/// Result limit used when a caller passes `0`.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// A slug with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub slug: String,
    pub similarity: f32,
}

/// Cosine similarity of two vectors.
///
/// Returns `0.0` when the lengths differ or either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

pub(crate) fn normalize_limit(limit: usize) -> usize {
    if limit == 0 {
        DEFAULT_SEARCH_LIMIT
    } else {
        limit
    }
}

/// Descending by similarity; NaN sorts last. Stable.
pub(crate) fn sort_by_similarity(results: &mut [SearchResult]) {
    results.sort_by(|a, b| match (a.similarity.is_nan(), b.similarity.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b
            .similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal),
    });
}

/// Similarity search over an [`EmbeddingStore`].
#[derive(Clone)]
pub struct VectorSearch {
    store: Arc<dyn EmbeddingStore>,
}

impl VectorSearch {
    pub fn new(store: Arc<dyn EmbeddingStore>) -> Self {
        Self { store }
    }

    /// Rank every stored vector against `query`, highest first.
    pub async fn search(&self, query: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let limit = normalize_limit(limit);
        let embeddings = self.store.list_all().await?;
        let scanned = embeddings.len();

        let mut results: Vec<SearchResult> = embeddings
            .into_iter()
            .map(|e| SearchResult {
                similarity: cosine_similarity(query, &e.vector),
                slug: e.slug,
            })
            .collect();
        sort_by_similarity(&mut results);
        results.truncate(limit);

        debug!(scanned, returned = results.len(), "vector search");
        Ok(results)
    }

    /// Like [`search`](Self::search) but drops results below `threshold`.
    ///
    /// Over-fetches `2 × limit` candidates before filtering; fewer than `limit`
    /// results may come back when not enough pass the threshold.
    pub async fn search_with_threshold(
        &self,
        query: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let limit = normalize_limit(limit);
        let mut results = self.search(query, limit.saturating_mul(2)).await?;
        results.retain(|r| r.similarity >= threshold);
        results.truncate(limit);
        Ok(results)
    }

    /// Write a vector directly, without content or model bookkeeping.
    ///
    /// The stored record has an empty fingerprint and model version, so the
    /// embedding cache treats it as stale on its next access.
    pub async fn store(&self, slug: &str, vector: Vec<f32>) -> Result<()> {
        self.store
            .upsert(&Embedding::new(slug, "", "", "", vector))
            .await
    }

    pub async fn delete(&self, slug: &str) -> Result<bool> {
        self.store.delete(slug).await
    }

    pub async fn count(&self) -> Result<u64> {
        self.store.count().await
    }
}

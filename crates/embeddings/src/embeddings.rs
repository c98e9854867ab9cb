use async_trait::async_trait;

/// Turns text into a fixed-width vector. Implemented outside the cache
/// (HTTP APIs, local models, test doubles).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Embed several texts. The default calls [`embed`](Self::embed) in order.
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn model_name(&self) -> &str;

    fn dimensions(&self) -> usize;

    /// Stable key identifying provider + model, used in logs and metrics labels.
    fn provider_key(&self) -> &str {
        self.model_name()
    }
}

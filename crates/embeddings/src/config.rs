use serde::{Deserialize, Serialize};

/// Configuration for the embedding cache and its default provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    /// When false, the cache returns empty vectors and never calls the provider.
    pub enabled: bool,
    /// Name of the embedding model recorded alongside each vector.
    pub model_name: String,
    /// Version tag; bumping it invalidates every cached vector.
    pub model_version: String,
    /// Expected vector width of the configured model.
    pub dimensions: usize,
    /// Base URL of an OpenAI-compatible embeddings API.
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model_name: "text-embedding-3-small".into(),
            model_version: "1".into(),
            dimensions: 1536,
            base_url: "https://api.openai.com".into(),
            api_key_env: "OPENAI_API_KEY".into(),
        }
    }
}

impl EmbeddingsConfig {
    pub fn with_model(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.model_name = name.into();
        self.model_version = version.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Embedding provider for OpenAI-compatible `/v1/embeddings` endpoints.
use async_trait::async_trait;
use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    sha2::{Digest, Sha256},
};

#[cfg(feature = "metrics")]
use metrics::counter;

use crate::{config::EmbeddingsConfig, embeddings::EmbeddingProvider};

pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    api_key: Secret<String>,
    base_url: String,
    model: String,
    dims: usize,
    provider_key: String,
}

fn compute_provider_key(base_url: &str, model: &str) -> String {
    let digest = Sha256::digest(format!("openai:{base_url}:{model}").as_bytes());
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

fn has_version_suffix(base_url: &str) -> bool {
    base_url
        .rsplit('/')
        .next()
        .and_then(|segment| segment.strip_prefix('v'))
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

fn embeddings_endpoint(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/embeddings") {
        base.to_string()
    } else if has_version_suffix(base) {
        format!("{base}/embeddings")
    } else {
        format!("{base}/v1/embeddings")
    }
}

impl OpenAiEmbeddingProvider {
    pub fn new(api_key: String, base_url: &str, model: &str, dims: usize) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            api_key: Secret::new(api_key),
            provider_key: compute_provider_key(&base_url, model),
            base_url,
            model: model.to_string(),
            dims,
        }
    }

    /// Build from config, reading the key from the configured environment variable.
    pub fn from_config(config: &EmbeddingsConfig) -> anyhow::Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| anyhow::anyhow!("{} is not set", config.api_key_env))?;
        Ok(Self::new(
            api_key,
            &config.base_url,
            &config.model_name,
            config.dimensions,
        ))
    }

    pub fn endpoint(&self) -> String {
        embeddings_endpoint(&self.base_url)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Order vectors by the `index` the API reports and check one came back per input.
fn collect_vectors(mut data: Vec<EmbeddingData>, expected: usize) -> anyhow::Result<Vec<Vec<f32>>> {
    if data.len() != expected {
        anyhow::bail!(
            "embedding response has {} vectors for {expected} inputs",
            data.len()
        );
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("empty embedding response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let req = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json::<EmbeddingResponse>()
            .await?;

        #[cfg(feature = "metrics")]
        counter!("mnemo_provider_requests_total", "provider" => "openai").increment(1);

        collect_vectors(resp.data, texts.len())
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn provider_key(&self) -> &str {
        &self.provider_key
    }
}

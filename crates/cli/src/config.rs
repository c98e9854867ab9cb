use std::path::{Path, PathBuf};

use {
    anyhow::Context as _,
    mnemo_database::DatabaseConfig,
    mnemo_embeddings::EmbeddingsConfig,
    serde::Deserialize,
    tracing::debug,
};

/// On-disk CLI configuration (`config.toml`).
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub embeddings: EmbeddingsConfig,
    pub database: DatabaseConfig,
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "mnemo", "mnemo")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load `explicit` (must exist) or the default location (may be absent).
pub fn load(explicit: Option<&Path>) -> anyhow::Result<Config> {
    match explicit {
        Some(path) => parse_file(path),
        None => match default_config_path() {
            Some(path) if path.is_file() => parse_file(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Config::default())
            },
        },
    }
}

fn parse_file(path: &Path) -> anyhow::Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

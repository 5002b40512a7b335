use crate::error::{MarkdownFetcherError, Result};
use crate::types::AppConfig;
use std::path::Path;
use tokio::fs;
use tracing::info;

impl AppConfig {
    /// Reads a JSON config file. Missing keys fall back to their defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| MarkdownFetcherError::Config {
                reason: format!("Cannot read config file {}: {}", path.display(), e),
            })?;

        let config = Self::from_json(&raw).map_err(|e| MarkdownFetcherError::Config {
            reason: format!("Invalid config file {}: {}", path.display(), e),
        })?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Loads `path` when given, otherwise the built-in defaults.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path).await,
            None => Ok(Self::default()),
        }
    }
}

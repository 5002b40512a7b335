use crate::error::{MarkdownFetcherError, Result};
use crate::types::{Document, FetchConfig, SourceType};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};
use url::Url;

pub struct ContentFetcher {
    client: Client,
}

impl ContentFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client })
    }

    /// Fetches `source`, a URL or a local file path.
    ///
    /// `base_url` overrides the URL used to resolve relative images; for URLs it
    /// defaults to the final URL after redirects, for files to none at all.
    pub async fn fetch(&self, source: &str, base_url: Option<&str>) -> Result<Document> {
        match Self::validate_source(source)? {
            SourceType::Url => self.fetch_from_url(source, base_url).await,
            SourceType::LocalFile => Self::fetch_from_file(source, base_url).await,
        }
    }

    async fn fetch_from_url(&self, source: &str, base_url: Option<&str>) -> Result<Document> {
        info!("Fetching content from URL: {}", source);

        let url = Url::parse(source.trim())?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(MarkdownFetcherError::HttpStatus {
                status: response.status().as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let bytes = response.bytes().await?;
        let html = String::from_utf8(bytes.to_vec()).map_err(|e| MarkdownFetcherError::Decode {
            reason: format!("Response body is not valid UTF-8: {}", e),
        })?;

        debug!("Fetched {} bytes from {}", html.len(), final_url);

        Ok(Document {
            source: source.to_string(),
            base_url: base_url.map(str::to_string).unwrap_or(final_url),
            html,
            source_type: SourceType::Url,
            fetched_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    async fn fetch_from_file(file_path: &str, base_url: Option<&str>) -> Result<Document> {
        info!("Reading file: {}", file_path);

        let html = fs::read_to_string(file_path).await?;

        Ok(Document {
            source: file_path.to_string(),
            base_url: base_url.unwrap_or_default().to_string(),
            html,
            source_type: SourceType::LocalFile,
            fetched_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    fn is_url(source: &str) -> bool {
        let lower = source.trim_start().to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }

    /// Classifies a source, rejecting blank input, unparsable URLs and missing files.
    pub fn validate_source(source: &str) -> Result<SourceType> {
        if source.trim().is_empty() {
            return Err(MarkdownFetcherError::InvalidInput {
                reason: "Missing 'url' parameter".to_string(),
            });
        }

        if Self::is_url(source) {
            let url = Url::parse(source.trim())?;
            if url.host_str().map_or(true, str::is_empty) {
                return Err(MarkdownFetcherError::InvalidInput {
                    reason: format!("URL has no host: {}", source),
                });
            }
            return Ok(SourceType::Url);
        }

        if source.contains("://") {
            return Err(MarkdownFetcherError::InvalidInput {
                reason: format!("Unsupported URL scheme: {}", source),
            });
        }

        let path = Path::new(source);
        if path.is_file() {
            Ok(SourceType::LocalFile)
        } else {
            Err(MarkdownFetcherError::FileNotFound {
                path: source.to_string(),
            })
        }
    }
}

use crate::error::{MarkdownFetcherError, Result};
use crate::services::converter::MarkdownConverter;
use crate::services::fetcher::ContentFetcher;
use crate::types::{ConversionResponse, ConvertedPage};
use std::sync::Arc;
use tracing::{info, warn};

/// Fetches a source and converts it, one source per call.
pub struct ConversionWorkflow {
    fetcher: ContentFetcher,
    converter: Arc<MarkdownConverter>,
}

impl ConversionWorkflow {
    pub fn new(fetcher: ContentFetcher, converter: Arc<MarkdownConverter>) -> Self {
        Self { fetcher, converter }
    }

    /// Fetch errors short-circuit before any conversion work starts.
    pub async fn run(&self, source: &str, base_url: Option<&str>) -> Result<ConvertedPage> {
        let mut document = self.fetcher.fetch(source, base_url).await?;

        // The page moves into the blocking task and comes back with the result
        let converter = Arc::clone(&self.converter);
        let html = std::mem::take(&mut document.html);
        let base = document.base_url.clone();
        let (html, (markdown, stats)) = tokio::task::spawn_blocking(move || {
            let converted = converter.convert_with_stats(&html, &base);
            (html, converted)
        })
        .await
        .map_err(|e| MarkdownFetcherError::conversion(e.to_string()))?;
        document.html = html;

        info!(
            "Converted '{}' using '{}' strategy ({} bytes of Markdown)",
            document.source,
            stats.strategy.as_str(),
            markdown.len()
        );

        Ok(ConvertedPage {
            document,
            markdown,
            stats,
        })
    }

    /// Like [`run`](Self::run), but folds every outcome into a response envelope.
    pub async fn respond(
        &self,
        source: &str,
        base_url: Option<&str>,
        include_stats: bool,
    ) -> ConversionResponse {
        match self.run(source, base_url).await {
            Ok(page) => ConversionResponse::success(page, include_stats),
            Err(e) => {
                warn!("Failed to convert '{}': {}", source, e);
                ConversionResponse::failure(Some(source), &e)
            }
        }
    }
}

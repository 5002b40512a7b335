use crate::error::Result;
use crate::services::extractor::ContentExtractor;
use crate::services::normalizer::Normalizer;
use crate::services::rewriter::MarkupRewriter;
use crate::services::stripper::TagStripper;
use crate::types::{ConversionStats, ExtractorConfig};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static HTML_H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1\b[^>]*>.*?</h1>").expect("valid regex"));
static MARKDOWN_H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+\S.*$").expect("valid regex"));

/// HTML to Markdown pipeline: extract, rewrite, strip, normalize.
///
/// Holds no per-call state, so one instance can serve any number of
/// concurrent conversions.
#[derive(Default)]
pub struct MarkdownConverter {
    extractor: ContentExtractor,
}

impl MarkdownConverter {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        Ok(Self {
            extractor: ContentExtractor::new(config)?,
        })
    }

    /// Converts `html` to Markdown. Malformed markup degrades to best-effort text.
    pub fn convert(&self, html: &str, base_url: &str) -> String {
        self.convert_with_stats(html, base_url).0
    }

    pub fn convert_with_stats(&self, html: &str, base_url: &str) -> (String, ConversionStats) {
        let fragment = self.extractor.extract(html);
        let fragment_length = fragment.text.len();

        let rewritten = MarkupRewriter::rewrite(&fragment.text, base_url);
        let stripped = TagStripper::strip(&rewritten);
        let markdown = Normalizer::normalize(&stripped);

        let stats = ConversionStats {
            strategy: fragment.strategy,
            html_h1_count: HTML_H1_RE.find_iter(html).count(),
            markdown_h1_count: MARKDOWN_H1_RE.find_iter(&markdown).count(),
            fragment_length,
            markdown_length: markdown.len(),
        };

        debug!(
            "Converted {} bytes of HTML into {} bytes of Markdown (h1: {} in HTML, {} in Markdown)",
            html.len(),
            stats.markdown_length,
            stats.html_h1_count,
            stats.markdown_h1_count
        );

        (markdown, stats)
    }
}

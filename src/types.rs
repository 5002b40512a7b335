use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::PathBuf;

use crate::error::{ErrorCategory, MarkdownFetcherError};

/// User-Agent sent by default; some sites refuse requests that do not look like a browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";

pub const DEFAULT_CONTENT_PATTERNS: &[&str] = &[
    "entry-content",
    "post-content",
    "article-content",
    "column-content",
    "entry_content",
    "post_content",
    "article_content",
    "column_content",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    LocalFile,
    Url,
}

/// Raw HTML plus the URL its relative references resolve against.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub source: String,
    pub base_url: String,
    #[serde(skip)]
    pub html: String,
    pub source_type: SourceType,
    pub fetched_at: String,
}

/// Which extraction tier produced a fragment, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractionStrategy {
    ContentClass,
    Article,
    Main,
    HeadingWindow,
    Body,
    RawDocument,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::ContentClass => "contentClass",
            ExtractionStrategy::Article => "article",
            ExtractionStrategy::Main => "main",
            ExtractionStrategy::HeadingWindow => "headingWindow",
            ExtractionStrategy::Body => "body",
            ExtractionStrategy::RawDocument => "rawDocument",
        }
    }
}

/// The part of a document judged to hold the article.
#[derive(Debug, Clone)]
pub struct ContentFragment<'a> {
    pub text: Cow<'a, str>,
    pub strategy: ExtractionStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStats {
    pub strategy: ExtractionStrategy,
    pub html_h1_count: usize,
    pub markdown_h1_count: usize,
    pub fragment_length: usize,
    pub markdown_length: usize,
}

#[derive(Debug, Clone)]
pub struct ConvertedPage {
    pub document: Document,
    pub markdown: String,
    pub stats: ConversionStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Fragments of `class`/`id` values marking the article container, tried in order.
    pub content_patterns: Vec<String>,
    pub heading_window_before: usize,
    pub heading_window_after: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            content_patterns: DEFAULT_CONTENT_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            heading_window_before: 500,
            heading_window_after: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub extractor: ExtractorConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub output_files: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, String)>,
}

/// JSON envelope returned for every converted source.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<ConversionStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorCategory>,
}

impl ConversionResponse {
    pub fn success(page: ConvertedPage, include_stats: bool) -> Self {
        Self {
            success: true,
            url: Some(page.document.source),
            content: Some(page.markdown),
            fetched_at: Some(page.document.fetched_at),
            debug: include_stats.then_some(page.stats),
            error: None,
            error_kind: None,
        }
    }

    pub fn failure(source: Option<&str>, err: &MarkdownFetcherError) -> Self {
        Self {
            success: false,
            url: source.filter(|s| !s.trim().is_empty()).map(str::to_string),
            content: None,
            fetched_at: None,
            debug: None,
            error: Some(err.to_string()),
            error_kind: Some(err.category()),
        }
    }
}

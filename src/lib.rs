//! # Markdown Fetcher Library
//!
//! Fetches an HTML page and reduces its main content to simple Markdown.
//!
//! Conversion is a fixed pipeline of pure text passes:
//! content extraction, markup rewriting, tag stripping and whitespace
//! normalization. It never fails on malformed HTML; fetching is the only
//! fallible step.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use markdown_fetcher::{ContentFetcher, ConversionWorkflow, FetchConfig, MarkdownConverter};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Convert HTML already in hand
//!     let markdown = markdown_fetcher::convert(
//!         "<article><h1>Hello</h1><p>World</p></article>",
//!         "https://example.com/post",
//!     );
//!     assert_eq!(markdown, "# Hello\n\nWorld");
//!
//!     // Or fetch and convert in one go
//!     let fetcher = ContentFetcher::new(&FetchConfig::default())?;
//!     let workflow = ConversionWorkflow::new(fetcher, Arc::new(MarkdownConverter::default()));
//!     let page = workflow.run("https://example.com/post", None).await?;
//!
//!     println!("{}", page.markdown);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod services;
pub mod types;

use std::sync::LazyLock;

// Re-export main types and services for easier usage
pub use error::{ErrorCategory, MarkdownFetcherError, Result};
pub use services::{
    BatchConverter, ContentExtractor, ContentFetcher, ConversionWorkflow, MarkdownConverter,
    MarkupRewriter, Normalizer, TagStripper,
};
pub use types::{
    AppConfig, BatchConfig, BatchResult, ContentFragment, ConversionResponse, ConversionStats,
    ConvertedPage, Document, ExtractionStrategy, ExtractorConfig, FetchConfig, SourceType,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

static DEFAULT_CONVERTER: LazyLock<MarkdownConverter> = LazyLock::new(MarkdownConverter::default);

/// Converts `html` to Markdown with the default extraction settings.
///
/// `base_url` is only used to make relative image sources absolute.
pub fn convert(html: &str, base_url: &str) -> String {
    DEFAULT_CONVERTER.convert(html, base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_workflow() {
        let html = r#"<html>
<body>
  <nav>Menu</nav>
  <div class="article-content">
    <h1>First</h1>
    <p>Intro&nbsp;text.</p>
    <h1>Second</h1>
    <p><img src="/img/a.png" alt="A"> and <img src="b.png" alt="B"></p>
  </div>
</body>
</html>"#;

        let markdown = convert(html, "https://ex.com/blog/post");

        assert_eq!(
            markdown,
            "# First\n\nIntro text.\n\n## Second\n\n![A](https://ex.com/img/a.png) and ![B](https://ex.com/blog/b.png)"
        );
    }

    #[test]
    fn test_entities() {
        assert_eq!(convert("&amp;&lt;&gt;&quot;&nbsp;x &copy;", ""), "&<>\" x &copy;");
    }

    #[test]
    fn test_converter_creation() {
        let converter = MarkdownConverter::new(&ExtractorConfig::default());
        assert!(converter.is_ok());

        let empty = ExtractorConfig {
            content_patterns: vec![String::new()],
            ..ExtractorConfig::default()
        };
        assert!(MarkdownConverter::new(&empty).is_err());
    }

    #[test]
    fn test_conversion_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MarkdownConverter>();
    }
}

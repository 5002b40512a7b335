use crate::error::{MarkdownFetcherError, Result};
use crate::types::{ContentFragment, ExtractionStrategy, ExtractorConfig};
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<article\b[^>]*>(.*?)</article>").expect("valid regex"));
static MAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<main\b[^>]*>(.*?)</main>").expect("valid regex"));
static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1\b[^>]*>.*?</h1>").expect("valid regex"));
static BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*)</body>").expect("valid regex"));
static ANY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(/?)([a-z][a-z0-9]*)\b[^>]*>").expect("valid regex"));
static PAGE_CHROME_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["header", "footer", "nav", "aside"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}>")).expect("valid regex")
        })
        .collect()
});

/// Extraction tiers in the order they are tried.
const STRATEGIES: [ExtractionStrategy; 5] = [
    ExtractionStrategy::ContentClass,
    ExtractionStrategy::Article,
    ExtractionStrategy::Main,
    ExtractionStrategy::HeadingWindow,
    ExtractionStrategy::Body,
];

/// Picks the region of an HTML document most likely to be the article body.
pub struct ContentExtractor {
    content_patterns: Vec<Regex>,
    heading_window_before: usize,
    heading_window_after: usize,
}

impl ContentExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let mut content_patterns = Vec::with_capacity(config.content_patterns.len());

        for fragment in &config.content_patterns {
            if fragment.trim().is_empty() {
                return Err(MarkdownFetcherError::Config {
                    reason: "Content pattern must not be empty".to_string(),
                });
            }

            // Opening tag of any element whose class or id contains the fragment
            let pattern = format!(
                r#"(?is)<[a-z][a-z0-9]*\b[^>]*\s(?:class|id)\s*=\s*["'][^"']*{}[^"']*["'][^>]*>"#,
                regex::escape(fragment)
            );
            let regex = Regex::new(&pattern).map_err(|e| MarkdownFetcherError::Config {
                reason: format!("Invalid content pattern '{}': {}", fragment, e),
            })?;
            content_patterns.push(regex);
        }

        Ok(Self {
            content_patterns,
            heading_window_before: config.heading_window_before,
            heading_window_after: config.heading_window_after,
        })
    }

    /// Returns the article region, or the whole input when no tier matches.
    pub fn extract<'a>(&self, html: &'a str) -> ContentFragment<'a> {
        for strategy in STRATEGIES {
            if let Some(text) = self.try_strategy(strategy, html) {
                debug!(
                    "Extracted {} bytes using '{}' strategy",
                    text.len(),
                    strategy.as_str()
                );
                return ContentFragment { text, strategy };
            }
        }

        debug!("No content region found, using the raw document");
        ContentFragment {
            text: Cow::Borrowed(html),
            strategy: ExtractionStrategy::RawDocument,
        }
    }

    fn try_strategy<'a>(&self, strategy: ExtractionStrategy, html: &'a str) -> Option<Cow<'a, str>> {
        match strategy {
            ExtractionStrategy::ContentClass => self.content_class(html).map(Cow::Borrowed),
            ExtractionStrategy::Article => first_capture(&ARTICLE_RE, html).map(Cow::Borrowed),
            ExtractionStrategy::Main => first_capture(&MAIN_RE, html).map(Cow::Borrowed),
            ExtractionStrategy::HeadingWindow => self.heading_window(html).map(Cow::Borrowed),
            ExtractionStrategy::Body => cleaned_body(html).map(Cow::Owned),
            ExtractionStrategy::RawDocument => Some(Cow::Borrowed(html)),
        }
    }

    fn content_class<'a>(&self, html: &'a str) -> Option<&'a str> {
        let mut closes: Option<HashMap<usize, usize>> = None;

        for pattern in &self.content_patterns {
            for open_tag in pattern.find_iter(html) {
                if open_tag.as_str().ends_with("/>") {
                    continue;
                }
                let closes = closes.get_or_insert_with(|| close_offsets(html));
                if let Some(&close) = closes.get(&open_tag.end()) {
                    return Some(&html[open_tag.end()..close]);
                }
            }
        }
        None
    }

    fn heading_window<'a>(&self, html: &'a str) -> Option<&'a str> {
        let heading = H1_RE.find(html)?;
        Some(char_window(
            html,
            heading.start(),
            self.heading_window_before,
            self.heading_window_after,
        ))
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default()).expect("default content patterns are valid")
    }
}

fn first_capture<'a>(regex: &Regex, html: &'a str) -> Option<&'a str> {
    regex
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Maps the end of every opening tag to the start of its matching close tag,
/// pairing nested elements of the same name. Unclosed elements have no entry.
fn close_offsets(html: &str) -> HashMap<usize, usize> {
    let mut open: HashMap<String, Vec<usize>> = HashMap::new();
    let mut closes = HashMap::new();

    for caps in ANY_TAG_RE.captures_iter(html) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());

        if closing {
            if let Some(open_end) = open.get_mut(&name).and_then(Vec::pop) {
                closes.insert(open_end, whole.start());
            }
        } else if !whole.as_str().ends_with("/>") {
            open.entry(name).or_default().push(whole.end());
        }
    }

    closes
}

/// Span of `before` characters ahead of `anchor` through `after` characters past it,
/// clamped to the text.
fn char_window(text: &str, anchor: usize, before: usize, after: usize) -> &str {
    let start = text[..anchor]
        .char_indices()
        .rev()
        .take(before)
        .last()
        .map(|(idx, _)| idx)
        .unwrap_or(anchor);
    let end = text[anchor..]
        .char_indices()
        .nth(after)
        .map(|(idx, _)| anchor + idx)
        .unwrap_or(text.len());

    &text[start..end]
}

fn cleaned_body(html: &str) -> Option<String> {
    let body = first_capture(&BODY_RE, html)?;
    let mut cleaned = body.to_string();
    for chrome in PAGE_CHROME_RES.iter() {
        cleaned = chrome.replace_all(&cleaned, "").into_owned();
    }
    Some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> (String, ExtractionStrategy) {
        let fragment = ContentExtractor::default().extract(html);
        (fragment.text.into_owned(), fragment.strategy)
    }

    #[test]
    fn test_content_class_wins_over_article() {
        let html = r#"<html><body>
            <article><p>teaser</p></article>
            <div class="wrapper entry-content large"><p>real body</p></div>
        </body></html>"#;

        let (text, strategy) = extract(html);
        assert_eq!(strategy, ExtractionStrategy::ContentClass);
        assert_eq!(text, "<p>real body</p>");
    }

    #[test]
    fn test_content_class_keeps_nested_containers() {
        let html = r#"<div class="post-content"><div class="lead">one</div><p>two</p></div><div>after</div>"#;

        let (text, _) = extract(html);
        assert_eq!(text, r#"<div class="lead">one</div><p>two</p>"#);
    }

    #[test]
    fn test_content_class_pattern_order() {
        let html = r#"<section class="post-content">post</section><div id="entry-content">entry</div>"#;

        let (text, _) = extract(html);
        assert_eq!(text, "entry");
    }

    #[test]
    fn test_content_class_unclosed_falls_through() {
        let html = r#"<div class="entry-content"><p>never closed<article>story</article>"#;

        let (text, strategy) = extract(html);
        assert_eq!(strategy, ExtractionStrategy::Article);
        assert_eq!(text, "story");
    }

    #[test]
    fn test_data_attributes_are_not_content_class() {
        let html = r#"<div data-class="entry-content">x</div><p data-id="post-content">y</p><article>real</article>"#;

        let (text, strategy) = extract(html);
        assert_eq!(strategy, ExtractionStrategy::Article);
        assert_eq!(text, "real");
    }

    #[test]
    fn test_many_unclosed_content_containers() {
        let html = format!(
            "<html><body>{}</body></html>",
            "<div class=\"entry-content\"><span>x</span>".repeat(20_000)
        );

        let started = std::time::Instant::now();
        let (_, strategy) = extract(&html);

        assert_eq!(strategy, ExtractionStrategy::Body);
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[test]
    fn test_article_then_main() {
        let (text, strategy) = extract("<MAIN>main</MAIN><Article class=\"x\">\nstory\n</Article>");
        assert_eq!(strategy, ExtractionStrategy::Article);
        assert_eq!(text, "\nstory\n");

        let (text, strategy) = extract("<body><main id=\"m\">only main</main></body>");
        assert_eq!(strategy, ExtractionStrategy::Main);
        assert_eq!(text, "only main");
    }

    #[test]
    fn test_heading_window_clamps_to_document() {
        let html = "<div>intro</div><h1>Title</h1><p>text</p>";

        let (text, strategy) = extract(html);
        assert_eq!(strategy, ExtractionStrategy::HeadingWindow);
        assert_eq!(text, html);
    }

    #[test]
    fn test_heading_window_bounds() {
        let config = ExtractorConfig {
            heading_window_before: 3,
            heading_window_after: 14,
            ..ExtractorConfig::default()
        };
        let extractor = ContentExtractor::new(&config).unwrap();
        let html = "0123456789<h1>Title</h1>tail tail tail";

        let fragment = extractor.extract(html);
        assert_eq!(fragment.strategy, ExtractionStrategy::HeadingWindow);
        assert_eq!(fragment.text, "789<h1>Title</h1>");
    }

    #[test]
    fn test_heading_window_multibyte_text() {
        let config = ExtractorConfig {
            heading_window_before: 2,
            heading_window_after: 100,
            ..ExtractorConfig::default()
        };
        let extractor = ContentExtractor::new(&config).unwrap();
        let html = "記事の本文<h1>見出し</h1>";

        let fragment = extractor.extract(html);
        assert_eq!(fragment.text, "本文<h1>見出し</h1>");
    }

    #[test]
    fn test_body_fallback_removes_page_chrome() {
        let html = r#"<html><body>
<header><a href="/">Home</a></header>
<nav>menu</nav>
<p>Body text</p>
<aside>related</aside>
<footer>copyright</footer>
</body></html>"#;

        let (text, strategy) = extract(html);
        assert_eq!(strategy, ExtractionStrategy::Body);
        assert!(text.contains("<p>Body text</p>"));
        assert!(!text.contains("menu"));
        assert!(!text.contains("related"));
        assert!(!text.contains("copyright"));
        assert!(!text.contains("Home"));
    }

    #[test]
    fn test_raw_document_fallback() {
        let html = "<div>no body element</div>";

        let (text, strategy) = extract(html);
        assert_eq!(strategy, ExtractionStrategy::RawDocument);
        assert_eq!(text, html);
    }

    #[test]
    fn test_unterminated_body_falls_back_to_raw() {
        let html = "<html><body><div>never closed";

        let (text, strategy) = extract(html);
        assert_eq!(strategy, ExtractionStrategy::RawDocument);
        assert_eq!(text, html);
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        let config = ExtractorConfig {
            content_patterns: vec!["main-body".to_string(), "  ".to_string()],
            ..ExtractorConfig::default()
        };

        assert!(matches!(
            ContentExtractor::new(&config),
            Err(MarkdownFetcherError::Config { .. })
        ));
    }

    #[test]
    fn test_custom_pattern_is_literal() {
        let config = ExtractorConfig {
            content_patterns: vec!["story.body".to_string()],
            ..ExtractorConfig::default()
        };
        let extractor = ContentExtractor::new(&config).unwrap();

        let fragment = extractor.extract(r#"<div class="storyXbody">no</div>"#);
        assert_eq!(fragment.strategy, ExtractionStrategy::RawDocument);

        let fragment = extractor.extract(r#"<div class="story.body">yes</div>"#);
        assert_eq!(fragment.strategy, ExtractionStrategy::ContentClass);
        assert_eq!(fragment.text, "yes");
    }
}

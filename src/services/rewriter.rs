use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::warn;
use url::Url;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($re).expect("valid regex"));
    };
}

pattern!(SCRIPT_RE, r"(?is)<script\b[^>]*>.*?</script>");
pattern!(STYLE_RE, r"(?is)<style\b[^>]*>.*?</style>");
pattern!(H1_RE, r"(?is)<h1\b[^>]*>(.*?)</h1>");
pattern!(H2_RE, r"(?is)<h2\b[^>]*>(.*?)</h2>");
pattern!(H3_RE, r"(?is)<h3\b[^>]*>(.*?)</h3>");
pattern!(H4_RE, r"(?is)<h4\b[^>]*>(.*?)</h4>");
pattern!(PARAGRAPH_RE, r"(?is)<p\b[^>]*>(.*?)</p>");
pattern!(LIST_ITEM_RE, r"(?is)<li\b[^>]*>(.*?)</li>");
pattern!(LIST_WRAPPER_RE, r"(?i)</?ul\b[^>]*>");
pattern!(LINE_BREAK_RE, r"(?i)<br\s*/?>");
pattern!(STRONG_RE, r"(?is)<strong\b[^>]*>(.*?)</strong>");
pattern!(BOLD_RE, r"(?is)<b\b[^>]*>(.*?)</b>");
pattern!(LINK_RE, r#"(?is)<a\b[^>]*?\shref="([^"]*)"[^>]*>(.*?)</a>"#);
pattern!(IMAGE_RE, r#"(?is)<img\b[^>]*?\ssrc="([^"]*)"[^>]*?\salt="([^"]*)"[^>]*>"#);

/// A single pass over the whole fragment. `base_url` is only consulted by image rewriting.
pub type RewriteStep = fn(&str, &str) -> String;

/// Rewrites in application order; later steps rely on earlier ones having run.
pub const REWRITE_STEPS: &[(&str, RewriteStep)] = &[
    ("scripts_and_styles", remove_scripts_and_styles),
    ("headings", rewrite_headings),
    ("paragraphs", rewrite_paragraphs),
    ("lists", rewrite_lists),
    ("line_breaks", rewrite_line_breaks),
    ("emphasis", rewrite_emphasis),
    ("links", rewrite_links),
    ("images", rewrite_images),
];

/// Turns structural and inline HTML markup into Markdown syntax.
pub struct MarkupRewriter;

impl MarkupRewriter {
    pub fn rewrite(fragment: &str, base_url: &str) -> String {
        REWRITE_STEPS
            .iter()
            .fold(fragment.to_string(), |text, (_, step)| step(&text, base_url))
    }
}

fn remove_scripts_and_styles(text: &str, _base_url: &str) -> String {
    let text = SCRIPT_RE.replace_all(text, "");
    STYLE_RE.replace_all(&text, "").into_owned()
}

fn rewrite_headings(text: &str, _base_url: &str) -> String {
    // Only the first h1 stays a title; the rest drop to level two.
    let mut h1_seen = false;
    let text = H1_RE.replace_all(text, |caps: &Captures| {
        let marker = if h1_seen { "##" } else { "#" };
        h1_seen = true;
        format!("\n{} {}\n", marker, caps[1].trim())
    });

    let mut text = text.into_owned();
    for (regex, marker) in [(&*H2_RE, "##"), (&*H3_RE, "###"), (&*H4_RE, "####")] {
        text = regex
            .replace_all(&text, |caps: &Captures| {
                format!("\n{} {}\n", marker, caps[1].trim())
            })
            .into_owned();
    }
    text
}

fn rewrite_paragraphs(text: &str, _base_url: &str) -> String {
    PARAGRAPH_RE.replace_all(text, "\n${1}\n").into_owned()
}

fn rewrite_lists(text: &str, _base_url: &str) -> String {
    let text = LIST_ITEM_RE.replace_all(text, "- ${1}");
    LIST_WRAPPER_RE.replace_all(&text, "").into_owned()
}

fn rewrite_line_breaks(text: &str, _base_url: &str) -> String {
    LINE_BREAK_RE.replace_all(text, "\n").into_owned()
}

fn rewrite_emphasis(text: &str, _base_url: &str) -> String {
    let text = STRONG_RE.replace_all(text, "**${1}**");
    BOLD_RE.replace_all(&text, "**${1}**").into_owned()
}

fn rewrite_links(text: &str, _base_url: &str) -> String {
    LINK_RE.replace_all(text, "[${2}](${1})").into_owned()
}

fn rewrite_images(text: &str, base_url: &str) -> String {
    IMAGE_RE
        .replace_all(text, |caps: &Captures| {
            format!("![{}]({})", &caps[2], resolve_image_url(&caps[1], base_url))
        })
        .into_owned()
}

/// Makes an image source absolute against `base_url`.
///
/// Absolute and protocol-relative sources are returned as-is. When the base
/// cannot be parsed or the join fails, the original source is kept.
pub fn resolve_image_url(src: &str, base_url: &str) -> String {
    if src.is_empty() || is_absolute(src) {
        return src.to_string();
    }

    match Url::parse(base_url).and_then(|base| base.join(src)) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            warn!(
                "Could not resolve image '{}' against '{}': {}; keeping original",
                src, base_url, e
            );
            src.to_string()
        }
    }
}

fn is_absolute(src: &str) -> bool {
    let lower = src.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://ex.com/blog/post";

    #[test]
    fn test_only_first_h1_stays_top_level() {
        let out = MarkupRewriter::rewrite("<h1>A</h1><p>x</p><h1 class=\"t\">B</h1>", BASE);

        assert_eq!(out.matches("\n# ").count(), 1);
        assert!(out.contains("\n# A\n"));
        assert!(out.contains("\n## B\n"));
    }

    #[test]
    fn test_heading_levels() {
        let out = MarkupRewriter::rewrite("<H2>Two</H2><h3> Three </h3><h4>Four</h4><h5>Five</h5>", BASE);

        assert!(out.contains("\n## Two\n"));
        assert!(out.contains("\n### Three\n"));
        assert!(out.contains("\n#### Four\n"));
        assert!(out.contains("<h5>Five</h5>"));
    }

    #[test]
    fn test_scripts_and_styles_removed() {
        let out = MarkupRewriter::rewrite(
            "<p>keep</p><SCRIPT type=\"text/javascript\">\nvar x = '<p>no</p>';\n</SCRIPT><style>\np { color: red }\n</style>",
            BASE,
        );

        assert_eq!(out, "\nkeep\n");
    }

    #[test]
    fn test_lists_and_breaks() {
        let out = MarkupRewriter::rewrite("<ul class=\"x\"><li>one</li><li>two<br/>more</li></ul>", BASE);

        assert_eq!(out, "- one- two\nmore");
    }

    #[test]
    fn test_paragraph_does_not_match_pre() {
        let out = MarkupRewriter::rewrite("<pre>code</pre><p>text</p>", BASE);

        assert_eq!(out, "<pre>code</pre>\ntext\n");
    }

    #[test]
    fn test_emphasis() {
        let out = MarkupRewriter::rewrite("<strong>loud</strong> and <b class=\"k\">bold</b><br>", BASE);

        assert_eq!(out, "**loud** and **bold**\n");
    }

    #[test]
    fn test_links() {
        let out = MarkupRewriter::rewrite(r#"<a href="https://x.com">click</a>"#, BASE);
        assert_eq!(out, "[click](https://x.com)");

        let out = MarkupRewriter::rewrite(r#"<a class="c" href="/about" target="_blank">About</a>"#, BASE);
        assert_eq!(out, "[About](/about)");
    }

    #[test]
    fn test_single_quoted_link_is_left_alone() {
        let html = "<a href='https://x.com'>click</a>";
        assert_eq!(MarkupRewriter::rewrite(html, BASE), html);
    }

    #[test]
    fn test_images_resolve_against_base() {
        let out = MarkupRewriter::rewrite(r#"<img src="/img/a.png" alt="root">"#, BASE);
        assert_eq!(out, "![root](https://ex.com/img/a.png)");

        let out = MarkupRewriter::rewrite(r#"<img class="x" src="a.png" width="10" alt="rel" />"#, BASE);
        assert_eq!(out, "![rel](https://ex.com/blog/a.png)");
    }

    #[test]
    fn test_absolute_images_unchanged() {
        assert_eq!(resolve_image_url("https://cdn.ex.com/a.png", BASE), "https://cdn.ex.com/a.png");
        assert_eq!(resolve_image_url("http://cdn.ex.com/a.png", BASE), "http://cdn.ex.com/a.png");
        assert_eq!(resolve_image_url("//cdn.ex.com/a.png", BASE), "//cdn.ex.com/a.png");
    }

    #[test]
    fn test_unresolvable_image_keeps_original() {
        assert_eq!(resolve_image_url("a.png", "not a url"), "a.png");
        assert_eq!(resolve_image_url("/img/a.png", ""), "/img/a.png");
    }

    #[test]
    fn test_linked_image() {
        let out = MarkupRewriter::rewrite(
            r#"<a href="https://ex.com/full.png"><img src="thumb.png" alt="thumb"></a>"#,
            BASE,
        );

        assert_eq!(out, "[![thumb](https://ex.com/blog/thumb.png)](https://ex.com/full.png)");
    }

    #[test]
    fn test_step_order() {
        let names: Vec<&str> = REWRITE_STEPS.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec![
                "scripts_and_styles",
                "headings",
                "paragraphs",
                "lists",
                "line_breaks",
                "emphasis",
                "links",
                "images"
            ]
        );
    }
}

use regex::Regex;
use std::sync::LazyLock;

// ASCII whitespace only: full-width spaces (U+3000) are paragraph indentation
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\s)*\n(?-u:\s)*\n(?-u:\s)*").expect("valid regex")
});

/// Final whitespace cleanup.
pub struct Normalizer;

impl Normalizer {
    /// Collapses whitespace runs spanning two or more newlines into one blank line, then trims.
    pub fn normalize(text: &str) -> String {
        BLANK_RUN_RE.replace_all(text, "\n\n").trim_ascii().to_string()
    }
}

use regex::{Captures, Regex};
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(nbsp|amp|lt|gt|quot);").expect("valid regex"));

/// Drops leftover markup and decodes the handful of entities the converter understands.
pub struct TagStripper;

impl TagStripper {
    pub fn strip(text: &str) -> String {
        let without_tags = TAG_RE.replace_all(text, "");
        Self::decode_entities(&without_tags)
    }

    /// Decodes `&nbsp;`, `&amp;`, `&lt;`, `&gt;` and `&quot;` in a single pass.
    /// Every other entity, named or numeric, is left as written.
    pub fn decode_entities(text: &str) -> String {
        ENTITY_RE
            .replace_all(text, |caps: &Captures| match &caps[1] {
                "nbsp" => " ",
                "amp" => "&",
                "lt" => "<",
                "gt" => ">",
                _ => "\"",
            })
            .into_owned()
    }
}

//! Doc block extraction from handler source text.

use std::sync::OnceLock;

use regex::Regex;

fn block_comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)/\*\*?(.*?)\*/").expect("block comment pattern is valid"))
}

/// Contents of the first block comment (`/** ... */` or `/* ... */`).
///
/// The text between the markers is returned verbatim.
pub fn extract(source: &str) -> Option<String> {
    block_comment_regex()
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

//! Submission sanitizer
//!
//! Strips markup and script patterns from text values before they reach the
//! submit collaborator. Runs after validation, so it never produces errors.

use crate::forms::FieldValue;
use regex::Regex;
use std::sync::OnceLock;

fn script_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("static pattern"))
}

fn markup_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("static pattern"))
}

fn script_uri_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bjavascript\s*:").expect("static pattern"))
}

/// Sanitize one text value
pub fn sanitize_text(input: &str) -> String {
    let without_scripts = script_block_re().replace_all(input, "");
    let without_tags = markup_tag_re().replace_all(&without_scripts, "");
    let without_uris = script_uri_re().replace_all(&without_tags, "");
    without_uris
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitize a field value, recursing into list entries
pub fn sanitize_value(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(s) => FieldValue::Text(sanitize_text(s)),
        FieldValue::List(items) => {
            FieldValue::List(items.iter().map(|s| sanitize_text(s)).collect())
        }
        other => other.clone(),
    }
}

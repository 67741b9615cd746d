//! Bracketed annotation extraction.
//!
//! Identifiers carry metadata as `[key]` / `[key:value]` substrings. The
//! scanner is non-greedy and left to right: each `[` is closed by the next
//! `]`, and nesting is not special-cased (an inner `]` closes the outer
//! match early). The scanner never fails; text that does not form a bracket
//! pair is simply left alone.

use serde::{Deserialize, Serialize};

/// One annotation in order of appearance. `value` is empty when the
/// bracketed substring had no `:` delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub key: String,
    pub value: String,
}

/// A tokenized annotation before its value parts are rejoined: the `:`-split
/// remainder is kept apart because the filter rules inspect individual parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagParts {
    pub key: String,
    pub values: Vec<String>,
}

impl TagParts {
    /// Collapse into the stored form, value parts rejoined with single
    /// spaces.
    pub fn to_annotation(&self) -> Annotation {
        Annotation {
            key: self.key.clone(),
            value: self.values.join(" "),
        }
    }
}

/// Byte spans of `[...]` pairs, including the brackets. Both delimiters are
/// ASCII, so byte scanning cannot split a UTF-8 sequence.
fn scan_brackets(raw: &str) -> Vec<(usize, usize)> {
    let bytes = raw.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let Some(open) = bytes[pos..].iter().position(|&b| b == b'[') else {
            break;
        };
        let open = pos + open;
        let Some(close) = bytes[open + 1..].iter().position(|&b| b == b']') else {
            break;
        };
        let close = open + 1 + close;
        spans.push((open, close + 1));
        pos = close + 1;
    }
    spans
}

/// Split one bracket interior on `:` into a key and its value parts.
pub fn split_tag(tag: &str) -> TagParts {
    let mut parts = tag.split(':');
    let key = parts.next().unwrap_or_default().to_string();
    TagParts {
        key,
        values: parts.map(str::to_string).collect(),
    }
}

/// Tokenize every bracketed annotation in `raw`, order of appearance
/// preserved. Empty input yields an empty sequence.
pub fn tokenize(raw: &str) -> Vec<TagParts> {
    scan_brackets(raw)
        .into_iter()
        .map(|(start, end)| split_tag(&raw[start + 1..end - 1]))
        .collect()
}

/// `raw` with every scanned `[...]` span removed. Malformed bracket syntax
/// never matches and is therefore left in place.
pub fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pos = 0;
    for (start, end) in scan_brackets(raw) {
        out.push_str(&raw[pos..start]);
        pos = end;
    }
    out.push_str(&raw[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(tags: &[TagParts]) -> Vec<&str> {
        tags.iter().map(|t| t.key.as_str()).collect()
    }

    #[test]
    fn tokenize_preserves_order_and_duplicates() {
        let tags = tokenize("[sig-storage] mid [Conformance] tail [sig-storage]");
        assert_eq!(keys(&tags), vec!["sig-storage", "Conformance", "sig-storage"]);
    }

    #[test]
    fn tokenize_empty_input_yields_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("no brackets here").is_empty());
    }

    #[test]
    fn split_keeps_multi_part_values_apart() {
        let tag = split_tag("Feature:a:b");
        assert_eq!(tag.key, "Feature");
        assert_eq!(tag.values, vec!["a", "b"]);
        assert_eq!(tag.to_annotation().value, "a b");
    }

    #[test]
    fn split_without_delimiter_has_no_values() {
        let tag = split_tag("Conformance");
        assert_eq!(tag.key, "Conformance");
        assert!(tag.values.is_empty());
        assert_eq!(tag.to_annotation().value, "");
    }

    #[test]
    fn suite_path_value_survives_intact() {
        let tag = split_tag("Suite:openshift/conformance");
        assert_eq!(tag.to_annotation().value, "openshift/conformance");
    }

    #[test]
    fn strip_removes_every_well_formed_annotation() {
        let stripped = strip_tags("[sig-node] pods [Serial] should restart");
        assert_eq!(stripped, " pods  should restart");
        assert!(!stripped.contains('[') && !stripped.contains(']'));
    }

    #[test]
    fn unbalanced_open_bracket_is_left_in_place() {
        assert!(tokenize("tail [unclosed").is_empty());
        assert_eq!(strip_tags("tail [unclosed"), "tail [unclosed");
    }

    // Nested annotations are undefined behavior; this pins the non-greedy
    // scan so a change is at least visible.
    #[test]
    fn nested_brackets_close_early() {
        let tags = tokenize("[outer [inner]]");
        assert_eq!(keys(&tags), vec!["outer [inner"]);
        assert_eq!(strip_tags("[outer [inner]]"), "]");
    }

    #[test]
    fn multibyte_text_around_annotations_is_preserved() {
        let raw = "[sig-storage] caché über";
        assert_eq!(strip_tags(raw), " caché über");
        assert_eq!(tokenize(raw).len(), 1);
    }
}

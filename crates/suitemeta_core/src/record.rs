//! Normalized record construction from one raw identifier line.

use serde::{Deserialize, Serialize};

use crate::annotation::{strip_tags, tokenize, Annotation};
use crate::filters::{apply_tag_rules, membership_key, FilterMap, FilterValue};
use crate::suite::DEFAULT_SUITES;

/// One classified test identifier. `raw_name` is the identity key within its
/// suite; `display_name` and `tags` are derived from it. The derivation is
/// lossy: bracket formatting nuances do not round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub raw_name: String,
    pub display_name: String,
    pub tags: Vec<Annotation>,
    pub filters: FilterMap,
}

/// Build a record from one raw line. Blank and whitespace-only lines yield
/// no record; this is the only input filtering step. Never fails otherwise.
pub fn build_record(line: &str) -> Option<TestRecord> {
    if line.trim().is_empty() {
        return None;
    }

    let mut filters = FilterMap::new();
    for suite in DEFAULT_SUITES {
        filters.insert(membership_key(suite), FilterValue::NotApplicable);
    }

    let mut tags = Vec::new();
    for tag in tokenize(line) {
        apply_tag_rules(&mut filters, &tag);
        tags.push(tag.to_annotation());
    }

    let display_name = strip_tags(line)
        .trim_matches(|c: char| c == '"' || c.is_whitespace())
        .to_string();

    Some(TestRecord {
        raw_name: line.to_string(),
        display_name,
        tags,
        filters,
    })
}

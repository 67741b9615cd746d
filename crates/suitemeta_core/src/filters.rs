//! Filter derivation over tokenized annotations.
//!
//! A fixed rule table maps a handful of recognized annotation shapes to
//! named filter attributes. Everything else is ignored for filtering (the
//! annotation still lands in the record's tag list). Filter maps are
//! insertion-ordered: column derivation downstream depends on first-seen
//! key order.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::annotation::TagParts;

/// Sentinel marking "this filter concept does not apply to this record",
/// kept distinct from `false` in every projection.
pub const NOT_APPLICABLE: &str = "---";

pub const FILTER_IS_CONFORMANCE: &str = "is_conformance";
pub const FILTER_SIG: &str = "sig";
pub const FILTER_SUITE_K8S: &str = "suite_k8s";
pub const FILTER_SUITE: &str = "suite";

/// Insertion-ordered filter attributes of one record.
pub type FilterMap = IndexMap<String, FilterValue>;

/// A derived filter attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Flag(bool),
    Text(String),
    NotApplicable,
}

impl FilterValue {
    /// String form used in tabular rows and filter-query matching.
    pub fn render(&self) -> String {
        match self {
            FilterValue::Flag(flag) => flag.to_string(),
            FilterValue::Text(text) => text.clone(),
            FilterValue::NotApplicable => NOT_APPLICABLE.to_string(),
        }
    }

    /// Filter queries arrive as plain strings, so matching compares the
    /// rendered form: `"true"` selects `Flag(true)`.
    pub fn matches(&self, query: &str) -> bool {
        self.render() == query
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterValue::Flag(flag) => serializer.serialize_bool(*flag),
            FilterValue::Text(text) => serializer.serialize_str(text),
            FilterValue::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FilterValueVisitor;

        impl<'de> Visitor<'de> for FilterValueVisitor {
            type Value = FilterValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a boolean or a string filter value")
            }

            fn visit_bool<E: de::Error>(self, flag: bool) -> Result<FilterValue, E> {
                Ok(FilterValue::Flag(flag))
            }

            fn visit_str<E: de::Error>(self, text: &str) -> Result<FilterValue, E> {
                if text == NOT_APPLICABLE {
                    Ok(FilterValue::NotApplicable)
                } else {
                    Ok(FilterValue::Text(text.to_string()))
                }
            }
        }

        deserializer.deserialize_any(FilterValueVisitor)
    }
}

/// Membership filter key for a suite name: `kubernetes/conformance` becomes
/// `in_kubernetes_conformance`.
pub fn membership_key(suite: &str) -> String {
    format!("in_{}", suite.replace('/', "_"))
}

/// Apply the first matching rule for one tokenized annotation, then stop.
/// Unrecognized keys have no filter effect; `suite_cmd` is recognized but
/// deliberately discarded.
pub fn apply_tag_rules(filters: &mut FilterMap, tag: &TagParts) {
    if tag.key == "Conformance" {
        filters.insert(FILTER_IS_CONFORMANCE.to_string(), FilterValue::Flag(true));
        return;
    }
    if tag.key.starts_with("sig") {
        filters.insert(FILTER_SIG.to_string(), FilterValue::Text(tag.key.clone()));
        return;
    }
    if tag.key == "Suite" {
        if tag.values.first().map(String::as_str) == Some("k8s") {
            filters.insert(FILTER_SUITE_K8S.to_string(), FilterValue::Flag(true));
        } else {
            filters.insert(
                FILTER_SUITE.to_string(),
                FilterValue::Text(tag.values.join(" ")),
            );
        }
    }
}

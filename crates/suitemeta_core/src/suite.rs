//! Suite classification, cross-suite membership, and filter queries.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::filters::{membership_key, FilterValue};
use crate::record::{build_record, TestRecord};

/// Suites gathered when the caller does not name any. Their membership keys
/// are pre-seeded on every record, whatever suites a run actually fetches.
pub const DEFAULT_SUITES: [&str; 2] = ["openshift/conformance", "kubernetes/conformance"];

/// Name of the synthetic suite produced by a filter query.
pub const FILTERED_SUITE_NAME: &str = "filtered";

/// One named suite and its classified records, built once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteRecord {
    pub name: String,
    /// SHA-256 of the raw upstream bytes this suite was classified from.
    /// Absent for synthetic suites.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_sha256: Option<String>,
    pub records: Vec<TestRecord>,
}

/// The unit passed between classification and serialization. Mutated in
/// place by [`annotate_membership`], read-only thereafter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub suites: Vec<SuiteRecord>,
}

/// Classify every line of a named suite, order preserving. Blank lines are
/// dropped by the record builder. Pure function of its inputs.
pub fn classify_suite(name: &str, lines: &[String]) -> SuiteRecord {
    SuiteRecord {
        name: name.to_string(),
        source_sha256: None,
        records: lines.iter().filter_map(|line| build_record(line)).collect(),
    }
}

/// Mark every record of `target` whose `raw_name` also appears in
/// `source_of_truth` with `in_<source_of_truth> = true`. Directional: only
/// `target` records are mutated; call twice with swapped arguments for a
/// symmetric relation. Unknown suite names are a no-op, as is a source
/// record with no match on the target side.
pub fn annotate_membership(payload: &mut Payload, target: &str, source_of_truth: &str) {
    let source_names: BTreeSet<String> = match payload
        .suites
        .iter()
        .find(|suite| suite.name == source_of_truth)
    {
        Some(suite) => suite
            .records
            .iter()
            .map(|record| record.raw_name.clone())
            .collect(),
        None => return,
    };

    let key = membership_key(source_of_truth);
    let Some(target_suite) = payload
        .suites
        .iter_mut()
        .find(|suite| suite.name == target)
    else {
        return;
    };
    for record in &mut target_suite.records {
        if source_names.contains(&record.raw_name) {
            record.filters.insert(key.clone(), FilterValue::Flag(true));
        }
    }
}

/// Reduce the payload to a single synthetic suite holding the records whose
/// filter map carries `key` with a rendered value equal to `value`. An empty
/// result is not an error; the suite is simply empty.
pub fn filter_by_key_value(payload: &Payload, key: &str, value: &str) -> Payload {
    let mut records = Vec::new();
    for suite in &payload.suites {
        for record in &suite.records {
            if record
                .filters
                .get(key)
                .is_some_and(|filter| filter.matches(value))
            {
                records.push(record.clone());
            }
        }
    }
    Payload {
        generated_at: payload.generated_at.clone(),
        suites: vec![SuiteRecord {
            name: FILTERED_SUITE_NAME.to_string(),
            source_sha256: None,
            records,
        }],
    }
}

//! Flat-schema derivation and the three output projections.
//!
//! The filter vocabulary is open (membership keys depend on which suites a
//! run gathered), so the tabular column set is derived by scanning every
//! record's filter keys across the whole payload, first-seen order, before
//! any row is emitted.

use std::fmt;

use crate::annotation::Annotation;
use crate::filters::NOT_APPLICABLE;
use crate::suite::Payload;

/// Fixed leading columns of the tabular projection.
pub const FIXED_COLUMNS: [&str; 4] = ["collection", "display_name", "tags", "raw_name"];

/// Prefix distinguishing derived filter columns from the fixed ones.
pub const FILTER_COLUMN_PREFIX: &str = "f_";

const CSV_DELIMITER: &str = ";";

#[derive(Debug)]
pub struct ProjectionError(pub String);

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "projection error: {}", self.0)
    }
}

impl std::error::Error for ProjectionError {}

/// Deduplicated, `f_`-prefixed filter columns in first-seen order across the
/// whole payload. Every filter key present on any record contributes a
/// column.
pub fn derive_filter_columns(payload: &Payload) -> Vec<String> {
    let mut columns = Vec::new();
    for suite in &payload.suites {
        for record in &suite.records {
            for key in record.filters.keys() {
                let column = format!("{}{}", FILTER_COLUMN_PREFIX, key);
                if !columns.contains(&column) {
                    columns.push(column);
                }
            }
        }
    }
    columns
}

/// Render tags back into bracket notation: `[key]` when the value is empty,
/// `[key:value]` otherwise, space-joined, order preserved. Lossy with
/// respect to the original inter-annotation spacing.
pub fn render_tags(tags: &[Annotation]) -> String {
    tags.iter()
        .map(|tag| {
            if tag.value.is_empty() {
                format!("[{}]", tag.key)
            } else {
                format!("[{}:{}]", tag.key, tag.value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_field(field: &str) -> String {
    if field.contains(CSV_DELIMITER) || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Semicolon-delimited tabular projection with a header row. Every record
/// fills every derived column; a filter key absent from a record renders as
/// the sentinel, never as an empty cell.
pub fn to_csv(payload: &Payload) -> String {
    let filter_columns = derive_filter_columns(payload);
    let mut header: Vec<&str> = FIXED_COLUMNS.to_vec();
    header.extend(filter_columns.iter().map(String::as_str));

    let mut out = String::new();
    out.push_str(&header.join(CSV_DELIMITER));
    out.push('\n');
    for suite in &payload.suites {
        for record in &suite.records {
            let mut row = vec![
                escape_field(&suite.name),
                escape_field(&record.display_name),
                escape_field(&render_tags(&record.tags)),
                escape_field(&record.raw_name),
            ];
            for column in &filter_columns {
                let key = column.strip_prefix(FILTER_COLUMN_PREFIX).unwrap_or(column);
                let value = record
                    .filters
                    .get(key)
                    .map(|filter| filter.render())
                    .unwrap_or_else(|| NOT_APPLICABLE.to_string());
                row.push(escape_field(&value));
            }
            out.push_str(&row.join(CSV_DELIMITER));
            out.push('\n');
        }
    }
    out
}

/// Hierarchical projection: the full payload as pretty-printed JSON.
pub fn to_json(payload: &Payload) -> Result<String, ProjectionError> {
    serde_json::to_string_pretty(payload)
        .map_err(|err| ProjectionError(format!("json encode: {}", err)))
}

/// Flat list of raw names, one per line, suite-then-record order. Suitable
/// for replaying through the upstream tool as a re-run filter.
pub fn to_flat_list(payload: &Payload) -> String {
    let mut out = String::new();
    for suite in &payload.suites {
        for record in &suite.records {
            out.push_str(&record.raw_name);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::tokenize;
    use crate::suite::classify_suite;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn sample_payload() -> Payload {
        Payload {
            generated_at: None,
            suites: vec![
                classify_suite(
                    "openshift/conformance",
                    &lines(&["[sig-storage] [Conformance] writes", "[Suite:k8s] foo"]),
                ),
                classify_suite("kubernetes/conformance", &lines(&["plain"])),
            ],
        }
    }

    #[test]
    fn columns_cover_every_filter_key_in_first_seen_order() {
        let payload = sample_payload();
        let columns = derive_filter_columns(&payload);
        assert_eq!(
            columns,
            vec![
                "f_in_openshift_conformance",
                "f_in_kubernetes_conformance",
                "f_sig",
                "f_is_conformance",
                "f_suite_k8s",
            ]
        );
    }

    #[test]
    fn csv_rows_have_a_value_for_every_column() {
        let payload = sample_payload();
        let csv = to_csv(&payload);
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].starts_with("collection;display_name;tags;raw_name;f_"));
        let width = rows[0].split(CSV_DELIMITER).count();
        for row in &rows[1..] {
            assert_eq!(row.split(CSV_DELIMITER).count(), width);
        }
        // "plain" has no sig filter: the cell is the sentinel, not blank.
        assert!(rows[3].ends_with(";---;---;---"));
    }

    #[test]
    fn csv_escapes_fields_holding_the_delimiter() {
        let payload = Payload {
            generated_at: None,
            suites: vec![classify_suite("all", &lines(&["odd;name"]))],
        };
        let csv = to_csv(&payload);
        assert!(csv.contains("\"odd;name\""));
    }

    #[test]
    fn rendered_tags_retokenize_to_the_same_pairs() {
        let payload = sample_payload();
        for suite in &payload.suites {
            for record in &suite.records {
                let rendered = render_tags(&record.tags);
                let reparsed: Vec<Annotation> = tokenize(&rendered)
                    .iter()
                    .map(|tag| tag.to_annotation())
                    .collect();
                assert_eq!(reparsed, record.tags, "round trip for {}", record.raw_name);
            }
        }
    }

    #[test]
    fn flat_list_keeps_suite_then_record_order() {
        let payload = sample_payload();
        let flat = to_flat_list(&payload);
        assert_eq!(
            flat,
            "[sig-storage] [Conformance] writes\n[Suite:k8s] foo\nplain\n"
        );
    }

    #[test]
    fn json_projection_round_trips() {
        let payload = sample_payload();
        let json = to_json(&payload).expect("encode");
        let back: Payload = serde_json::from_str(&json).expect("decode");
        assert_eq!(back, payload);
    }

    #[test]
    fn empty_payload_serializes_to_header_only_outputs() {
        let payload = Payload {
            generated_at: None,
            suites: vec![classify_suite("filtered", &[])],
        };
        let csv = to_csv(&payload);
        assert_eq!(csv, "collection;display_name;tags;raw_name\n");
        assert_eq!(to_flat_list(&payload), "");
        assert!(to_json(&payload).is_ok());
    }
}

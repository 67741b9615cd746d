//! Annotation parsing and cross-suite classification for e2e test listings.
//!
//! Takes the raw identifier lines an external test-listing tool emits,
//! extracts the bracketed annotations embedded in each identifier, derives
//! filter attributes from a fixed rule table, computes cross-suite
//! membership, and projects the classified payload into tabular, JSON, and
//! flat-list forms. Pure throughout: no I/O, no subprocess.

pub mod annotation;
pub mod filters;
pub mod projection;
pub mod record;
pub mod suite;

pub use annotation::{strip_tags, tokenize, Annotation, TagParts};
pub use filters::{
    apply_tag_rules, membership_key, FilterMap, FilterValue, NOT_APPLICABLE,
};
pub use projection::{
    derive_filter_columns, render_tags, to_csv, to_flat_list, to_json, ProjectionError,
    FILTER_COLUMN_PREFIX, FIXED_COLUMNS,
};
pub use record::{build_record, TestRecord};
pub use suite::{
    annotate_membership, classify_suite, filter_by_key_value, Payload, SuiteRecord,
    DEFAULT_SUITES, FILTERED_SUITE_NAME,
};

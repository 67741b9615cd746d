//! Set difference between two precomputed flat test lists.
//!
//! Operates on the flat-list output (or any newline-delimited list of raw
//! names); blank lines are skipped. Strictly simpler than the
//! classification pipeline and independent of it.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug)]
pub enum CompareError {
    SpecFormat(String),
    Io { path: String, message: String },
}

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareError::SpecFormat(spec) => {
                write!(f, "list spec '{}' has incorrect format, expected name=path", spec)
            }
            CompareError::Io { path, message } => write!(f, "read list '{}': {}", path, message),
        }
    }
}

impl std::error::Error for CompareError {}

/// A named list argument of the form `name=path`.
#[derive(Debug, Clone)]
pub struct ListSpec {
    pub name: String,
    pub path: PathBuf,
}

impl ListSpec {
    pub fn parse(spec: &str) -> Result<Self, CompareError> {
        let Some((name, path)) = spec.split_once('=') else {
            return Err(CompareError::SpecFormat(spec.to_string()));
        };
        if name.is_empty() || path.is_empty() {
            return Err(CompareError::SpecFormat(spec.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            path: PathBuf::from(path),
        })
    }
}

/// One-sided differences between two named lists.
#[derive(Debug, Clone, Serialize)]
pub struct CompareReport {
    pub left_name: String,
    pub left_total: usize,
    pub right_name: String,
    pub right_total: usize,
    pub left_only: Vec<String>,
    pub right_only: Vec<String>,
}

pub fn compare_lists(left: &ListSpec, right: &ListSpec) -> Result<CompareReport, CompareError> {
    let left_lines = read_list(left)?;
    let right_lines = read_list(right)?;

    let left_set: BTreeSet<&str> = left_lines.iter().map(String::as_str).collect();
    let right_set: BTreeSet<&str> = right_lines.iter().map(String::as_str).collect();

    let left_only = left_lines
        .iter()
        .filter(|line| !right_set.contains(line.as_str()))
        .cloned()
        .collect();
    let right_only = right_lines
        .iter()
        .filter(|line| !left_set.contains(line.as_str()))
        .cloned()
        .collect();

    Ok(CompareReport {
        left_name: left.name.clone(),
        left_total: left_lines.len(),
        right_name: right.name.clone(),
        right_total: right_lines.len(),
        left_only,
        right_only,
    })
}

fn read_list(spec: &ListSpec) -> Result<Vec<String>, CompareError> {
    let text = fs::read_to_string(&spec.path).map_err(|err| CompareError::Io {
        path: spec.path.display().to_string(),
        message: err.to_string(),
    })?;
    Ok(text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_name_equals_path() {
        let spec = ListSpec::parse("aws-parallel=tmp/aws-parallel.txt").expect("spec");
        assert_eq!(spec.name, "aws-parallel");
        assert_eq!(spec.path, PathBuf::from("tmp/aws-parallel.txt"));
    }

    #[test]
    fn parse_rejects_malformed_specs() {
        assert!(ListSpec::parse("no-separator").is_err());
        assert!(ListSpec::parse("=path-only").is_err());
        assert!(ListSpec::parse("name-only=").is_err());
    }

    #[test]
    fn missing_file_reports_the_path() {
        let spec = ListSpec {
            name: "a".to_string(),
            path: PathBuf::from("suitemeta-compare-missing.txt"),
        };
        let err = compare_lists(&spec, &spec).expect_err("missing file");
        assert!(err.to_string().contains("suitemeta-compare-missing.txt"));
    }
}

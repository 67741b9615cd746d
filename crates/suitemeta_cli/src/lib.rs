//! Export pipeline orchestration and output writing.
//!
//! Everything the `suitemeta` binary does lives here so integration tests
//! can drive the pipeline with a fake lister instead of the real upstream
//! binary.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use suitemeta_core::{
    annotate_membership, classify_suite, filter_by_key_value, to_csv, to_flat_list, to_json,
    Payload, DEFAULT_SUITES,
};
use suitemeta_discover::{DiscoverError, TestLister};

pub mod compare;

/// Output formats the export pipeline can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputType {
    Json,
    Csv,
    Txt,
}

impl OutputType {
    fn extension(self) -> &'static str {
        match self {
            OutputType::Json => "json",
            OutputType::Csv => "csv",
            OutputType::Txt => "txt",
        }
    }
}

/// Export pipeline configuration with documented defaults; there is no
/// module-level mutable state.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Suite names passed verbatim to the upstream tool, gathered in order.
    pub suites: Vec<String>,
    /// Optional key/value filter query applied after classification.
    pub filter: Option<(String, String)>,
    pub output_dir: PathBuf,
    pub output_base: String,
    pub output_types: Vec<OutputType>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            suites: DEFAULT_SUITES.iter().map(|s| s.to_string()).collect(),
            filter: None,
            output_dir: PathBuf::from("tmp"),
            output_base: "openshift-e2e-suites".to_string(),
            output_types: vec![OutputType::Json, OutputType::Csv, OutputType::Txt],
        }
    }
}

#[derive(Debug)]
pub enum ExportError {
    Discover(DiscoverError),
    Output(String),
}

impl ExportError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ExportError::Discover(err) => err.exit_code(),
            ExportError::Output(_) => 1,
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Discover(err) => write!(f, "{}", err),
            ExportError::Output(err) => write!(f, "output error: {}", err),
        }
    }
}

impl std::error::Error for ExportError {}

/// What a run produced, for the summary printers.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Suite name and classified record count, in serialization order.
    pub suites: Vec<(String, usize)>,
    pub written: Vec<PathBuf>,
}

/// Run the full pipeline: gather every suite once in order, classify,
/// relate the first two suites in both directions when present, apply the
/// optional filter query, then write the selected outputs. No file is
/// written before classification completes, so a failing gather leaves no
/// partial output behind.
pub fn run_export(
    lister: &dyn TestLister,
    config: &ExportConfig,
    generated_at: Option<String>,
) -> Result<ExportSummary, ExportError> {
    let mut payload = Payload {
        generated_at,
        suites: Vec::new(),
    };
    for suite_name in &config.suites {
        let listing = lister
            .list_suite(suite_name)
            .map_err(ExportError::Discover)?;
        let mut suite = classify_suite(suite_name, &listing.lines);
        suite.source_sha256 = Some(listing.source_sha256);
        payload.suites.push(suite);
    }

    if config.suites.len() >= 2 {
        let first = config.suites[0].clone();
        let second = config.suites[1].clone();
        annotate_membership(&mut payload, &second, &first);
        annotate_membership(&mut payload, &first, &second);
    }

    let payload = match &config.filter {
        Some((key, value)) => filter_by_key_value(&payload, key, value),
        None => payload,
    };

    let written = write_outputs(&payload, config)?;
    let suites = payload
        .suites
        .iter()
        .map(|suite| (suite.name.clone(), suite.records.len()))
        .collect();
    Ok(ExportSummary { suites, written })
}

fn write_outputs(payload: &Payload, config: &ExportConfig) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(&config.output_dir).map_err(|err| {
        ExportError::Output(format!(
            "create output dir '{}': {}",
            config.output_dir.display(),
            err
        ))
    })?;

    let mut written = Vec::new();
    for output_type in &config.output_types {
        let path = config
            .output_dir
            .join(format!("{}.{}", config.output_base, output_type.extension()));
        let contents = match output_type {
            OutputType::Json => {
                to_json(payload).map_err(|err| ExportError::Output(err.to_string()))?
            }
            OutputType::Csv => to_csv(payload),
            OutputType::Txt => to_flat_list(payload),
        };
        fs::write(&path, contents)
            .map_err(|err| ExportError::Output(format!("write '{}': {}", path.display(), err)))?;
        written.push(path);
    }
    Ok(written)
}

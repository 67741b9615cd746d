use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use suitemeta_cli::compare::{compare_lists, CompareError, ListSpec};
use suitemeta_cli::{run_export, ExportConfig, ExportError, OutputType};
use suitemeta_core::DEFAULT_SUITES;
use suitemeta_discover::{DiscoveryConfig, OpenshiftTestsCli};

#[derive(Parser)]
#[command(
    name = "suitemeta",
    version,
    about = "e2e suite discovery and classification utilities"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Export(ExportArgs),
    Compare(CompareArgs),
}

/// Discover, classify, and export the configured suites.
#[derive(Parser)]
struct ExportArgs {
    /// Suites to discover, comma-separated (passed verbatim to the listing
    /// tool; default: openshift/conformance,kubernetes/conformance)
    #[arg(long, value_delimiter = ',')]
    suites: Option<Vec<String>>,

    /// Filter records by this filter key before exporting
    #[arg(long, requires = "filter_value")]
    filter_key: Option<String>,

    /// Value the filter key must have
    #[arg(long, requires = "filter_key")]
    filter_value: Option<String>,

    /// Output directory for the exported files
    #[arg(long, value_name = "PATH", default_value = "tmp")]
    output_dir: PathBuf,

    /// Base file name for the exported files
    #[arg(long, default_value = "openshift-e2e-suites")]
    output_base: String,

    /// Output types to export, comma-separated (default: json,csv,txt)
    #[arg(long, value_enum, value_delimiter = ',')]
    output_types: Option<Vec<OutputType>>,

    /// Listing binary name/path
    #[arg(long, default_value = "openshift-tests")]
    bin: String,

    /// Output a JSON summary instead of key=value lines
    #[arg(long)]
    json: bool,
}

/// Compare two precomputed flat test lists.
#[derive(Parser)]
struct CompareArgs {
    /// First list (format: NAME=PATH)
    #[arg(long, value_name = "NAME=PATH")]
    left: String,

    /// Second list (format: NAME=PATH)
    #[arg(long, value_name = "NAME=PATH")]
    right: String,

    /// Output JSON (including the differing names) instead of key=value lines
    #[arg(long)]
    json: bool,
}

#[derive(Debug)]
enum CliError {
    Export(ExportError),
    Compare(CompareError),
    Encode(String),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Export(err) => err.exit_code(),
            CliError::Compare(_) | CliError::Encode(_) => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Export(err) => write!(f, "{}", err),
            CliError::Compare(err) => write!(f, "{}", err),
            CliError::Encode(err) => write!(f, "json encode: {}", err),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Export(args) => run_export_command(args),
        Commands::Compare(args) => run_compare_command(args),
    };
    if let Err(err) = result {
        eprintln!("{}", err);
        std::process::exit(err.exit_code());
    }
}

fn run_export_command(args: ExportArgs) -> Result<(), CliError> {
    let suites = args
        .suites
        .unwrap_or_else(|| DEFAULT_SUITES.iter().map(|s| s.to_string()).collect());
    let filter = match (args.filter_key, args.filter_value) {
        (Some(key), Some(value)) => Some((key, value)),
        _ => None,
    };
    let config = ExportConfig {
        suites,
        filter,
        output_dir: args.output_dir,
        output_base: args.output_base,
        output_types: args.output_types.unwrap_or_else(|| {
            vec![OutputType::Json, OutputType::Csv, OutputType::Txt]
        }),
    };

    let lister = OpenshiftTestsCli::new(DiscoveryConfig { bin: args.bin });
    let generated_at = Some(chrono::Utc::now().to_rfc3339());
    let summary = run_export(&lister, &config, generated_at).map_err(CliError::Export)?;

    if args.json {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "suites": summary
                .suites
                .iter()
                .map(|(name, tests)| serde_json::json!({ "name": name, "tests": tests }))
                .collect::<Vec<_>>(),
            "written": summary
                .written
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>(),
        }))
        .map_err(|err| CliError::Encode(err.to_string()))?;
        println!("{}", json);
    } else {
        for (name, tests) in &summary.suites {
            println!("suite={} tests={}", name, tests);
        }
        for path in &summary.written {
            println!("saved={}", path.display());
        }
    }
    Ok(())
}

fn run_compare_command(args: CompareArgs) -> Result<(), CliError> {
    let left = ListSpec::parse(&args.left).map_err(CliError::Compare)?;
    let right = ListSpec::parse(&args.right).map_err(CliError::Compare)?;
    let report = compare_lists(&left, &right).map_err(CliError::Compare)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|err| CliError::Encode(err.to_string()))?;
        println!("{}", json);
    } else {
        println!("left={} left_total={}", report.left_name, report.left_total);
        println!("right={} right_total={}", report.right_name, report.right_total);
        println!("left_only={}", report.left_only.len());
        println!("right_only={}", report.right_only.len());
    }
    Ok(())
}

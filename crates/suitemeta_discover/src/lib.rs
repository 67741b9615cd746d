//! Upstream test-listing collaborator.
//!
//! Wraps the external listing binary (`openshift-tests run --dry-run
//! <suite>`), invoked once per named suite. The whole run aborts on the
//! first upstream failure; "tool not found" is reported distinctly from
//! other failures and carries its conventional exit status.

use std::fmt;
use std::io::ErrorKind;
use std::process::Command;

use sha2::{Digest, Sha256};

/// Exit status conventionally meaning "command not found".
const EXIT_TOOL_NOT_FOUND: i32 = 127;

#[derive(Debug)]
pub enum DiscoverError {
    ToolNotFound {
        bin: String,
    },
    ToolExecutionFailed {
        suite: String,
        command: String,
        status: i32,
    },
    Io {
        suite: String,
        message: String,
    },
}

impl DiscoverError {
    /// Process exit code mirroring the upstream failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            DiscoverError::ToolNotFound { .. } => EXIT_TOOL_NOT_FOUND,
            DiscoverError::ToolExecutionFailed { status, .. } => *status,
            DiscoverError::Io { .. } => 1,
        }
    }
}

impl fmt::Display for DiscoverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoverError::ToolNotFound { bin } => write!(
                f,
                "the '{}' binary was not found; make sure it is installed and reachable on PATH",
                bin
            ),
            DiscoverError::ToolExecutionFailed {
                suite,
                command,
                status,
            } => write!(
                f,
                "collecting the list of tests for suite [{}] failed (exit {}); make sure you are able to run: {}",
                suite, status, command
            ),
            DiscoverError::Io { suite, message } => {
                write!(f, "listing suite [{}]: {}", suite, message)
            }
        }
    }
}

impl std::error::Error for DiscoverError {}

/// Raw listing for one suite, with provenance of the exact bytes consumed.
#[derive(Debug, Clone)]
pub struct SuiteListing {
    pub suite: String,
    pub lines: Vec<String>,
    pub source_sha256: String,
}

/// Line-oriented source of test identifiers for a named suite. The seam
/// exists so the export pipeline can run against a fake in tests.
pub trait TestLister {
    fn list_suite(&self, suite: &str) -> Result<SuiteListing, DiscoverError>;
}

/// Configuration for the external listing binary.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Binary name or path.
    pub bin: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            bin: "openshift-tests".to_string(),
        }
    }
}

/// [`TestLister`] backed by `<bin> run --dry-run <suite>`.
#[derive(Debug, Clone)]
pub struct OpenshiftTestsCli {
    config: DiscoveryConfig,
}

impl OpenshiftTestsCli {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    fn command_line(&self, suite: &str) -> String {
        format!("{} run --dry-run {}", self.config.bin, suite)
    }
}

impl TestLister for OpenshiftTestsCli {
    fn list_suite(&self, suite: &str) -> Result<SuiteListing, DiscoverError> {
        let output = Command::new(&self.config.bin)
            .arg("run")
            .arg("--dry-run")
            .arg(suite)
            .output()
            .map_err(|err| {
                if err.kind() == ErrorKind::NotFound {
                    DiscoverError::ToolNotFound {
                        bin: self.config.bin.clone(),
                    }
                } else {
                    DiscoverError::Io {
                        suite: suite.to_string(),
                        message: format!("spawn {}: {}", self.command_line(suite), err),
                    }
                }
            })?;

        if !output.status.success() {
            let status = output.status.code().unwrap_or(1);
            if status == EXIT_TOOL_NOT_FOUND {
                return Err(DiscoverError::ToolNotFound {
                    bin: self.config.bin.clone(),
                });
            }
            return Err(DiscoverError::ToolExecutionFailed {
                suite: suite.to_string(),
                command: self.command_line(suite),
                status,
            });
        }

        let source_sha256 = sha256_hex(&output.stdout);
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(SuiteListing {
            suite: suite.to_string(),
            lines: stdout.lines().map(str::to_string).collect(),
            source_sha256,
        })
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin_available(bin: &str) -> bool {
        Command::new(bin).output().is_ok()
    }

    #[test]
    fn command_line_matches_the_upstream_invocation() {
        let lister = OpenshiftTestsCli::new(DiscoveryConfig::default());
        assert_eq!(
            lister.command_line("openshift/conformance"),
            "openshift-tests run --dry-run openshift/conformance"
        );
    }

    #[test]
    fn missing_binary_maps_to_tool_not_found() {
        let lister = OpenshiftTestsCli::new(DiscoveryConfig {
            bin: "suitemeta-no-such-binary".to_string(),
        });
        let err = lister
            .list_suite("openshift/conformance")
            .expect_err("missing binary should fail");
        assert!(matches!(err, DiscoverError::ToolNotFound { .. }));
        assert_eq!(err.exit_code(), 127);
        assert!(err.to_string().contains("suitemeta-no-such-binary"));
    }

    #[test]
    fn successful_listing_captures_lines_and_provenance() {
        if !bin_available("echo") {
            return;
        }
        let lister = OpenshiftTestsCli::new(DiscoveryConfig {
            bin: "echo".to_string(),
        });
        let listing = lister.list_suite("kubernetes/conformance").expect("listing");
        assert_eq!(listing.suite, "kubernetes/conformance");
        assert_eq!(listing.lines, vec!["run --dry-run kubernetes/conformance"]);
        assert_eq!(listing.source_sha256.len(), 64);
    }

    #[test]
    fn nonzero_exit_maps_to_execution_failure_with_status() {
        if !bin_available("false") {
            return;
        }
        let lister = OpenshiftTestsCli::new(DiscoveryConfig {
            bin: "false".to_string(),
        });
        let err = lister
            .list_suite("openshift/conformance")
            .expect_err("false exits nonzero");
        match &err {
            DiscoverError::ToolExecutionFailed {
                suite,
                command,
                status,
            } => {
                assert_eq!(suite, "openshift/conformance");
                assert_eq!(command, "false run --dry-run openshift/conformance");
                assert_eq!(*status, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.exit_code(), 1);
    }
}

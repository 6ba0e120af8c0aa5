//! Preflight checks for patch build prerequisites.
//!
//! Validates everything the engine needs BEFORE it is launched, so a missing
//! keystore fails in a second instead of after the APK was downloaded.
//!
//! # Checks Performed
//!
//! - **Host tools**: the Java runtime is installed
//! - **Workspace files**: engine jar, patch bundle, integrations, keystore and
//!   options file exist in the working directory
//! - **Network**: the app's mirror is reachable
//!
//! # Usage
//!
//! ```rust,ignore
//! use apkpatch::preflight::PreflightChecker;
//!
//! let checker = PreflightChecker::new(&config).manifest(&manifest);
//! let report = checker.run_all().await;
//!
//! if !report.is_ok() {
//!     report.print_summary();
//!     std::process::exit(1);
//! }
//! ```

mod files;
mod host_tools;
mod network;

pub use files::check_workspace_files;
pub use host_tools::{check_host_tools, has_tool};
pub use network::check_network;

use crate::app::ApplicationManifest;
use crate::config::PatcherConfig;
use crate::sources::{self, SourceRegistry};

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
    /// Optional suggestion for fixing the issue
    pub suggestion: Option<String>,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Create a failing check result.
    pub fn fail(
        name: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create a warning check result (passes but with a note).
    pub fn warn(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            suggestion: None,
        }
    }
}

/// Comprehensive preflight report.
#[derive(Debug, Default)]
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    pub fn is_ok(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn errors(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn total_count(&self) -> usize {
        self.checks.len()
    }

    /// Print a summary of the preflight checks.
    pub fn print_summary(&self) {
        println!("=== Preflight Check Results ===\n");

        for check in &self.checks {
            let status = if check.passed { "[OK]" } else { "[FAIL]" };
            println!("{} {}: {}", status, check.name, check.message);
            if let Some(suggestion) = &check.suggestion {
                println!("     Suggestion: {}", suggestion);
            }
        }

        println!();
        if self.is_ok() {
            println!(
                "All preflight checks passed ({}/{})",
                self.passed_count(),
                self.total_count()
            );
        } else {
            println!(
                "Preflight checks failed: {} of {} passed",
                self.passed_count(),
                self.total_count()
            );
        }
    }
}

/// Preflight checker for one configuration and, optionally, one app.
pub struct PreflightChecker<'a> {
    config: &'a PatcherConfig,
    manifest: Option<&'a ApplicationManifest>,
    check_network: bool,
}

impl<'a> PreflightChecker<'a> {
    pub fn new(config: &'a PatcherConfig) -> Self {
        Self {
            config,
            manifest: None,
            check_network: true,
        }
    }

    /// Also check the files and mirror of this app.
    pub fn manifest(mut self, manifest: &'a ApplicationManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    pub fn offline(mut self) -> Self {
        self.check_network = false;
        self
    }

    /// Run all preflight checks and return a comprehensive report.
    pub async fn run_all(&self) -> PreflightReport {
        let mut report = PreflightReport::default();

        report.checks.extend(check_host_tools(&self.config.java));
        report
            .checks
            .extend(check_workspace_files(self.config, self.manifest));

        if self.check_network {
            if let Some(manifest) = self.manifest {
                match sources::default_registry().resolve(&manifest.app) {
                    Some(url) => report.checks.push(check_network(&url).await),
                    None => report.checks.push(CheckResult::warn(
                        "Network",
                        format!("No mirror known for '{}', skipped", manifest.app),
                    )),
                }
            }
        }

        report
    }
}

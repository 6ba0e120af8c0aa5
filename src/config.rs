//! Runtime configuration for patch builds.
//!
//! Values come from the environment, and the CLI may override any of them.
//!
//! # Environment Variables
//!
//! - `APKPATCH_WORK_DIR`: directory holding jars, keystore, options and APKs
//! - `APKPATCH_CI_TEST`: dry-run mode, every patch is excluded
//! - `APKPATCH_RIP_LIBS_APPS`: comma-separated app keys that get `--rip-lib`
//! - `APKPATCH_JAVA`: runtime used to launch the engine jar
//! - `APKPATCH_OPTIONS_FILE`: engine options file name
//!
//! # Example
//!
//! ```rust
//! use apkpatch::config::PatcherConfig;
//!
//! let config = PatcherConfig::from_lookup(|key| match key {
//!     "APKPATCH_CI_TEST" => Some("true".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//! assert!(config.ci_test);
//! assert_eq!(config.java, "java");
//! ```

use std::env;
use std::path::PathBuf;

use crate::error::{PatchError, Result};

pub const WORK_DIR_ENV: &str = "APKPATCH_WORK_DIR";
pub const CI_TEST_ENV: &str = "APKPATCH_CI_TEST";
pub const RIP_LIBS_APPS_ENV: &str = "APKPATCH_RIP_LIBS_APPS";
pub const JAVA_ENV: &str = "APKPATCH_JAVA";
pub const OPTIONS_FILE_ENV: &str = "APKPATCH_OPTIONS_FILE";

pub const DEFAULT_WORK_DIR: &str = "apks";
pub const DEFAULT_JAVA: &str = "java";
pub const DEFAULT_OPTIONS_FILE: &str = "options.json";

/// Settings shared by every build job in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatcherConfig {
    /// Every path handed to the engine is joined onto this directory.
    pub work_dir: PathBuf,
    /// Dry-run mode: patches are sent as excluded.
    pub ci_test: bool,
    /// Apps whose unused native libraries are stripped.
    pub rip_libs_apps: Vec<String>,
    /// Executable used to run the engine jar.
    pub java: String,
    /// Engine options file, relative to `work_dir`.
    pub options_file: String,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            ci_test: false,
            rip_libs_apps: Vec::new(),
            java: DEFAULT_JAVA.to_string(),
            options_file: DEFAULT_OPTIONS_FILE.to_string(),
        }
    }
}

impl PatcherConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = non_empty(lookup(WORK_DIR_ENV)) {
            config.work_dir = PathBuf::from(dir);
        }
        if let Some(flag) = non_empty(lookup(CI_TEST_ENV)) {
            config.ci_test = parse_bool(CI_TEST_ENV, &flag)?;
        }
        if let Some(apps) = lookup(RIP_LIBS_APPS_ENV) {
            config.rip_libs_apps = parse_list(&apps);
        }
        if let Some(java) = non_empty(lookup(JAVA_ENV)) {
            config.java = java;
        }
        if let Some(options) = non_empty(lookup(OPTIONS_FILE_ENV)) {
            config.options_file = options;
        }

        Ok(config)
    }

    /// Whether `app` is configured for native library stripping.
    pub fn rips_libs(&self, app: &str) -> bool {
        self.rip_libs_apps.iter().any(|a| a == app)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(PatchError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

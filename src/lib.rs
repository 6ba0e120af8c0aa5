//! APK patch builder library.
//!
//! Drives the external patch engine for one application at a time:
//!
//! 1. [`patches::PatchSet`] records which patches are included or excluded
//! 2. [`command::BuildCommand`] renders the engine's argument vector
//! 3. [`runner::ProcessRunner`] launches the engine and streams its output
//!
//! [`sources`] maps an app key to the mirror its APK comes from.

pub mod app;
pub mod arch;
pub mod command;
pub mod config;
pub mod error;
pub mod patches;
pub mod preflight;
pub mod runner;
pub mod sources;

pub use error::{PatchError, Result};

use std::time::{Duration, Instant};

/// Wall-clock timer for a build stage.
///
/// ```rust
/// let t = apkpatch::Timer::start("Render");
/// let elapsed = t.finish();
/// assert!(elapsed.as_secs() < 60);
/// ```
#[derive(Debug)]
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start: Instant::now(),
        }
    }

    /// Stop the timer and log how long the stage took.
    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        tracing::debug!(
            stage = %self.label,
            "finished in {:.2}s",
            elapsed.as_secs_f64()
        );
        elapsed
    }
}

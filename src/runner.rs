//! Engine process execution.
//!
//! Spawns the engine, forwards its stdout line by line as it arrives, waits for
//! it to exit and reports how long the run took. The process is reached through
//! the [`Launcher`] trait so tests can swap in a fake.

use std::io::{self, BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::error::{PatchError, Result};
use crate::Timer;

/// A started engine process.
pub trait EngineProcess {
    /// Take the stdout pipe. Returns `None` if it was never attached.
    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>>;

    /// Block until the process exits. `None` means no exit code (signal).
    fn wait(&mut self) -> io::Result<Option<i32>>;
}

/// Something that can start the engine.
pub trait Launcher {
    fn launch(&self, program: &str, args: &[String]) -> io::Result<Box<dyn EngineProcess>>;
}

/// Launches real processes with stdout piped and stderr inherited.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, program: &str, args: &[String]) -> io::Result<Box<dyn EngineProcess>> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;
        Ok(Box::new(child))
    }
}

impl EngineProcess for std::process::Child {
    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>> {
        self.stdout
            .take()
            .map(|out| Box::new(out) as Box<dyn Read + Send>)
    }

    fn wait(&mut self) -> io::Result<Option<i32>> {
        std::process::Child::wait(self).map(|status| status.code())
    }
}

/// Outcome of a successful engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub app: String,
    pub elapsed: Duration,
    /// Number of output lines forwarded.
    pub lines: usize,
}

/// Default line sink: engine output goes to the `engine` log target.
pub fn log_line(line: &str) {
    tracing::debug!(target: "engine", "{}", line);
}

/// Runs the engine through a [`Launcher`].
#[derive(Debug, Clone)]
pub struct ProcessRunner<L = SystemLauncher> {
    launcher: L,
    runtime: String,
}

impl ProcessRunner<SystemLauncher> {
    /// Runner for real processes using `runtime` (usually `java`).
    pub fn new(runtime: impl Into<String>) -> Self {
        Self::with_launcher(SystemLauncher, runtime)
    }
}

impl<L: Launcher> ProcessRunner<L> {
    pub fn with_launcher(launcher: L, runtime: impl Into<String>) -> Self {
        Self {
            launcher,
            runtime: runtime.into(),
        }
    }

    /// Run the engine for `app`, logging every output line.
    pub fn run(&self, app: &str, args: &[String]) -> Result<PatchReport> {
        self.run_with_sink(app, args, &mut log_line)
    }

    /// Run the engine for `app`, handing every output line to `sink`.
    ///
    /// Fails with [`PatchError::PatchingFailed`] before anything is awaited if
    /// the process cannot be started or its stdout is missing. A non-zero
    /// exit is reported as [`PatchError::EngineExited`].
    pub fn run_with_sink(
        &self,
        app: &str,
        args: &[String],
        sink: &mut dyn FnMut(&str),
    ) -> Result<PatchReport> {
        tracing::debug!(
            runtime = %self.runtime,
            ?args,
            "sending request to patch engine"
        );

        let timer = Timer::start(format!("Patching {}", app));
        let mut process = self.launcher.launch(&self.runtime, args).map_err(|e| {
            PatchError::PatchingFailed(format!("failed to start {}: {}", self.runtime, e))
        })?;
        let stdout = process.take_stdout().ok_or_else(|| {
            PatchError::PatchingFailed("failed to attach to engine output".to_string())
        })?;

        let (lines, read_error) = forward_lines(stdout, sink);
        let code = process.wait()?;
        let elapsed = timer.finish();

        if let Some(e) = read_error {
            return Err(PatchError::Io(e));
        }
        if code != Some(0) {
            tracing::warn!(app, ?code, "patch engine did not exit cleanly");
            return Err(PatchError::EngineExited {
                app: app.to_string(),
                code,
            });
        }

        tracing::info!(
            app,
            "patching completed in {:.2} seconds",
            elapsed.as_secs_f64()
        );
        Ok(PatchReport {
            app: app.to_string(),
            elapsed,
            lines,
        })
    }
}

/// Forward each line of `output` to `sink` until the stream closes.
///
/// Returns the line count and the read error that stopped forwarding, if any.
fn forward_lines(
    output: Box<dyn Read + Send>,
    sink: &mut dyn FnMut(&str),
) -> (usize, Option<io::Error>) {
    let reader = BufReader::new(output);
    let mut count = 0;

    for chunk in reader.split(b'\n') {
        match chunk {
            Ok(mut bytes) => {
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
                sink(&String::from_utf8_lossy(&bytes));
                count += 1;
            }
            Err(e) => return (count, Some(e)),
        }
    }

    (count, None)
}

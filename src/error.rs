//! Error types for patch builds.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    /// The engine could not be started or its output could not be attached.
    #[error("Patching failed: {0}")]
    PatchingFailed(String),

    /// The engine ran but did not exit cleanly.
    #[error("Patch engine exited with {} for app {app}", describe_code(.code))]
    EngineExited { app: String, code: Option<i32> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("No download source known for app '{0}'")]
    UnknownSource(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, PatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_exited_message() {
        let err = PatchError::EngineExited {
            app: "youtube".into(),
            code: Some(2),
        };
        assert_eq!(
            err.to_string(),
            "Patch engine exited with status 2 for app youtube"
        );
    }

    #[test]
    fn test_signal_exit_message() {
        let err = PatchError::EngineExited {
            app: "reddit".into(),
            code: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}

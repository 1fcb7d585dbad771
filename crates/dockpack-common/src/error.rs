//! Unified error type for the dockpack workspace.
//!
//! Every library crate returns [`DockpackError`]; the CLI converts it into
//! `anyhow::Error` at the process boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum DockpackError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A build file, target, or producer registration is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// Two contributions wrote the same path into the build context.
    #[error("conflicting build context path {path}: written by both {first} and {second}")]
    Conflict {
        /// Relative path claimed twice.
        path: String,
        /// Origin of the first claim.
        first: String,
        /// Origin of the second claim.
        second: String,
    },

    /// An external process exited unsuccessfully.
    #[error("{program} failed with exit code {code:?}:\n{stderr}")]
    Process {
        /// Program that was run.
        program: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Standard error of the process, verbatim.
        stderr: String,
    },

    /// A concurrent producer task panicked or was cancelled.
    #[error("producer task failed: {message}")]
    Join {
        /// Description of the task failure.
        message: String,
    },

    /// YAML deserialization failed.
    #[error("YAML error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },
}

impl DockpackError {
    /// Shorthand for a [`DockpackError::Config`] with the given message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path it occurred at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, DockpackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_path_and_both_origins() {
        let err = DockpackError::Conflict {
            path: "app/main.py".into(),
            first: "//:lib".into(),
            second: "//:other".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("app/main.py"), "got: {msg}");
        assert!(msg.contains("//:lib") && msg.contains("//:other"), "got: {msg}");
    }

    #[test]
    fn process_message_carries_stderr_verbatim() {
        let err = DockpackError::Process {
            program: "docker".into(),
            code: Some(1),
            stderr: "no such image\nline two".into(),
        };
        assert!(err.to_string().ends_with("no such image\nline two"));
    }

    #[test]
    fn io_helper_keeps_path() {
        let err = DockpackError::io(
            "constraints.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("constraints.txt"));
    }
}

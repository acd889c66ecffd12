//! Error types for difflens.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose via
//! `?` and `From` conversions up to [`AppError`], which `main` reports.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level application error
//!   - [`RunnerError`] - The external command could not run or exited non-zero
//!   - [`ConfigError`] - Config file exists but cannot be read or parsed
//!   - [`LoggingError`] - Tracing subscriber could not be installed
//!   - `std::io::Error` - Terminal failures
//!
//! # Recovery Strategy
//!
//! Only stream-level failures are errors. Undecodable bytes, malformed commit
//! records and cancelled streams are recovered locally and never show up here:
//! decoding degrades to lossy text, a malformed record becomes an empty
//! [`Commit`](crate::model::Commit), and a cancelled fetch drops its in-flight
//! batch.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use thiserror::Error;

/// Top-level application error encompassing all failure modes.
///
/// Everything here is surfaced to the user; nothing in the core panics on bad
/// input.
///
/// # Examples
///
/// ```no_run
/// use difflens::model::error::{AppError, RunnerError};
///
/// fn load() -> Result<(), AppError> {
///     // RunnerError converts to AppError via From
///     spawn_git()?;
///     Ok(())
/// }
/// # fn spawn_git() -> Result<(), RunnerError> { Ok(()) }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// The version-control command failed.
    #[error("Command failed: {0}")]
    Runner(#[from] RunnerError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialised.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Terminal or TUI rendering error.
    ///
    /// Fatal: the terminal is restored and the error printed to stderr.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Failure reported by the command runner (`StreamFailed`).
///
/// The view that started the fetch keeps its last good content and shows a
/// notification; the process keeps running.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The program could not be started at all.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        /// Program that was executed (e.g. `git`).
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Reading the output stream failed midway.
    #[error("I/O error while reading command output: {0}")]
    Io(#[from] std::io::Error),

    /// The command ran but reported failure.
    #[error("Command exited with status {code:?}: {stderr}")]
    ExitStatus {
        /// Exit code, `None` when killed by a signal.
        code: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_status_message_includes_code_and_stderr() {
        let err = RunnerError::ExitStatus {
            code: Some(128),
            stderr: "fatal: bad revision 'nope'".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("128"), "message should include code: {msg}");
        assert!(msg.contains("bad revision"), "message should include stderr: {msg}");
    }

    #[test]
    fn spawn_error_names_program() {
        let err = RunnerError::Spawn {
            program: "git".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };

        assert!(err.to_string().starts_with("Failed to start git"));
    }

    #[test]
    fn runner_error_converts_into_app_error() {
        fn run() -> Result<(), AppError> {
            Err(RunnerError::ExitStatus {
                code: Some(1),
                stderr: String::new(),
            })?;
            Ok(())
        }

        assert!(matches!(run(), Err(AppError::Runner(_))));
    }

    #[test]
    fn io_error_converts_into_terminal_variant() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: AppError = io.into();

        assert!(matches!(err, AppError::Terminal(_)));
    }
}

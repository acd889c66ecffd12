//! Tracing subscriber initialization.
//!
//! The terminal belongs to the UI, so all diagnostics go to a log file.
//! Follow it with `tail -f` from another terminal.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why the file subscriber could not be installed.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log directory could not be created.
    #[error("cannot create log directory {dir}: {source}")]
    CreateDir {
        /// Directory that was being created.
        dir: PathBuf,
        /// Cause.
        #[source]
        source: std::io::Error,
    },

    /// The path ends in `..`, `/` or a non-UTF-8 name.
    #[error("log path {0:?} does not name a file")]
    NoFileName(PathBuf),

    /// Another global subscriber was installed first.
    #[error("a tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Directory and file name a log path resolves to.
///
/// A bare file name logs into the current directory.
pub fn split_log_path(log_path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let Some(file_name) = log_path.file_name().and_then(|n| n.to_str()) else {
        return Err(LoggingError::NoFileName(log_path.to_path_buf()));
    };

    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((directory, file_name.to_string()))
}

/// Install the global file-backed subscriber.
///
/// Honours `RUST_LOG`, defaulting to `info`. The log directory is created
/// first, so it exists even when a subscriber was already installed.
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    let (dir, file_name) = split_log_path(log_path)?;
    if let Err(source) = std::fs::create_dir_all(&dir) {
        return Err(LoggingError::CreateDir { dir, source });
    }

    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        .from_env_lossy();
    let writer = tracing_appender::rolling::never(&dir, file_name);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInstalled)?;

    tracing::info!(path = %log_path.display(), "Logging initialized");
    Ok(())
}

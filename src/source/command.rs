//! Version-control command construction and execution.
//!
//! The core only ever sees bytes: a [`CommandRunner`] turns an argument list
//! into a [`ByteStream`], and the stream's [`finish`](ByteStream::finish)
//! reports whether the command succeeded once the output has been drained.

use crate::model::RunnerError;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// `git log` format: 7 fields joined by `\x01`, records separated by NUL.
pub const LOG_FORMAT: &str = "--pretty=format:%H%x01%B%x01%an <%ae>%x01%ai%x01%cn <%ce>%x01%ci%x01%P";

/// Separator between log records (`git log -z`).
pub const LOG_RECORD_SEPARATOR: u8 = 0;

// ===== DiffTarget =====

/// What a diff is taken of.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiffTarget {
    /// A commit against its parents.
    Commit(String),
    /// Staged changes: index vs. `HEAD`.
    Index,
    /// Unstaged changes: working tree vs. index.
    WorkingTree,
}

impl DiffTarget {
    /// `true` for the two local-change targets, which have no author.
    pub fn is_local_changes(&self) -> bool {
        !matches!(self, DiffTarget::Commit(_))
    }

    /// Text shown in place of a commit message for local-change targets.
    pub fn description(&self) -> Option<&'static str> {
        match self {
            DiffTarget::Commit(_) => None,
            DiffTarget::Index => Some("Local changes checked in to index but not committed"),
            DiffTarget::WorkingTree => Some("Local uncommitted changes, not checked in to index"),
        }
    }
}

// ===== Argument builders =====

/// Arguments for one diff request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRequest {
    /// What to diff.
    pub target: DiffTarget,
    /// Restrict to these paths; empty means everything.
    pub paths: Vec<String>,
    /// Lines of context around each change.
    pub context_lines: u32,
    /// Extra options such as whitespace flags.
    pub extra_args: Vec<String>,
}

impl DiffRequest {
    /// Request with default context and no filters.
    pub fn new(target: DiffTarget) -> Self {
        Self {
            target,
            paths: Vec::new(),
            context_lines: 3,
            extra_args: Vec::new(),
        }
    }

    /// Full argument list (without the program name).
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = match &self.target {
            DiffTarget::Index => vec!["diff-index".into(), "--cached".into(), "HEAD".into()],
            DiffTarget::WorkingTree => vec!["diff-files".into()],
            DiffTarget::Commit(sha1) => {
                vec!["diff-tree".into(), "-r".into(), "--root".into(), sha1.clone()]
            }
        };

        args.extend(
            ["-p", "--textconv", "--submodule", "-C", "--cc", "--no-commit-id"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(format!("-U{}", self.context_lines));
        args.extend(self.extra_args.iter().cloned());

        if !self.paths.is_empty() {
            args.push("--".into());
            args.extend(self.paths.iter().cloned());
        }
        args
    }
}

/// Arguments for the commit log of `revision` (default `HEAD`).
pub fn log_args(revision: Option<&str>, paths: &[String]) -> Vec<String> {
    let mut args = vec!["log".to_string(), "-z".to_string(), LOG_FORMAT.to_string()];
    if let Some(revision) = revision {
        args.push(revision.to_string());
    }
    if !paths.is_empty() {
        args.push("--".into());
        args.extend(paths.iter().cloned());
    }
    args
}

// ===== Streams and runners =====

/// Output of a running command.
pub trait ByteStream: Read + Send {
    /// Wait for the command and report its outcome. Call after reading to EOF.
    fn finish(self: Box<Self>) -> Result<(), RunnerError>;

    /// Handle that stops the command from another thread, if it is a process.
    fn stop_handle(&self) -> Option<StopHandle> {
        None
    }
}

/// Starts commands and hands back their output.
pub trait CommandRunner {
    /// Start the command with `args`.
    fn spawn(&self, args: &[String]) -> Result<Box<dyn ByteStream>, RunnerError>;
}

/// Runs `git` as a child process.
#[derive(Debug, Clone)]
pub struct GitRunner {
    program: String,
    repo_dir: Option<PathBuf>,
}

impl Default for GitRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl GitRunner {
    /// Runner for `git` in the current directory.
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
            repo_dir: None,
        }
    }

    /// Run in `dir` instead of the current directory.
    pub fn with_repo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.repo_dir = Some(dir.into());
        self
    }

    /// Use another executable (tests, wrappers).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl CommandRunner for GitRunner {
    fn spawn(&self, args: &[String]) -> Result<Box<dyn ByteStream>, RunnerError> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.repo_dir {
            command.current_dir(dir);
        }

        debug!(program = %self.program, ?args, "Spawning command");
        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::Io(std::io::Error::other("child stdout not captured")))?;
        let stderr = child.stderr.take().map(drain_stderr);

        Ok(Box::new(ChildStream {
            child: StopHandle(Arc::new(Mutex::new(child))),
            stdout,
            stderr,
        }))
    }
}

// Stderr is read on its own thread so a chatty command never blocks on a
// full pipe while stdout is still being drained.
fn drain_stderr(mut pipe: ChildStderr) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut bytes) {
            warn!(error = %e, "Reading command stderr failed");
        }
        String::from_utf8_lossy(&bytes).into_owned()
    })
}

/// Kills and reaps a spawned child. Cloned out of a [`ChildStream`] so the
/// UI thread can stop a command whose stdout a worker is blocked on.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<Mutex<Child>>);

impl StopHandle {
    fn lock(&self) -> MutexGuard<'_, Child> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Kill the child if it is still running and wait for it.
    pub fn stop(&self) {
        let mut child = self.lock();
        if matches!(child.try_wait(), Ok(Some(_))) {
            return;
        }
        debug!(pid = child.id(), "Killing command");
        if let Err(e) = child.kill() {
            warn!(error = %e, "Killing command failed");
        }
        if let Err(e) = child.wait() {
            warn!(error = %e, "Reaping command failed");
        }
    }

    /// OS process id of the child.
    pub fn id(&self) -> u32 {
        self.lock().id()
    }
}

/// Stdout of a spawned child. Dropping it before [`finish`](ByteStream::finish)
/// kills the child.
#[derive(Debug)]
pub struct ChildStream {
    child: StopHandle,
    stdout: ChildStdout,
    stderr: Option<JoinHandle<String>>,
}

impl Read for ChildStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.stdout.read(buf)
    }
}

impl ByteStream for ChildStream {
    fn finish(mut self: Box<Self>) -> Result<(), RunnerError> {
        let status = self.child.lock().wait()?;
        let stderr = match self.stderr.take().map(JoinHandle::join) {
            Some(Ok(text)) => text,
            Some(Err(_)) => {
                warn!("Stderr reader panicked");
                String::new()
            }
            None => String::new(),
        };

        if status.success() {
            Ok(())
        } else {
            Err(RunnerError::ExitStatus {
                code: status.code(),
                stderr: stderr.trim().to_string(),
            })
        }
    }

    fn stop_handle(&self) -> Option<StopHandle> {
        Some(self.child.clone())
    }
}

impl Drop for ChildStream {
    fn drop(&mut self) {
        self.child.stop();
    }
}

/// In-memory stream with a scripted outcome.
///
/// Lets views and fetchers be driven without a repository.
#[derive(Debug)]
pub struct BufferStream {
    data: Cursor<Vec<u8>>,
    failure: Option<(Option<i32>, String)>,
}

impl BufferStream {
    /// Stream yielding `data` and then succeeding.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Cursor::new(data.into()),
            failure: None,
        }
    }

    /// Stream yielding `data` and then failing with exit `code`.
    pub fn failing(data: impl Into<Vec<u8>>, code: i32, stderr: impl Into<String>) -> Self {
        Self {
            data: Cursor::new(data.into()),
            failure: Some((Some(code), stderr.into())),
        }
    }
}

impl Read for BufferStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.data.read(buf)
    }
}

impl ByteStream for BufferStream {
    fn finish(self: Box<Self>) -> Result<(), RunnerError> {
        match self.failure {
            None => Ok(()),
            Some((code, stderr)) => Err(RunnerError::ExitStatus { code, stderr }),
        }
    }
}

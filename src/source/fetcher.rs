//! Background workers that drain command output.
//!
//! Each fetch owns one worker thread. Results cross back to the UI thread as
//! messages on an mpsc channel; the UI side polls without blocking.

use super::command::{ByteStream, StopHandle, LOG_RECORD_SEPARATOR};
use crate::model::RunnerError;
use crate::parser::{split_records, DiffStreamParser, LineChunker, ParsedBatch, DIFF_SEPARATOR};
use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// Size of each read from the command's output.
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Message from a diff worker.
#[derive(Debug)]
pub enum FetchEvent {
    /// Parsed records ready to append.
    Batch(ParsedBatch),
    /// The stream ended and the command succeeded.
    Finished,
    /// The command could not be read or exited with failure.
    Failed(RunnerError),
}

// ===== DiffFetcher =====

/// Handle to one in-flight diff fetch.
///
/// Dropping the handle cancels the fetch and kills the command.
pub struct DiffFetcher {
    rx: Receiver<FetchEvent>,
    cancelled: Arc<AtomicBool>,
    stop: Option<StopHandle>,
    done: bool,
}

impl DiffFetcher {
    /// Parse `stream` on a worker, numbering records from `start_row`.
    pub fn start(stream: Box<dyn ByteStream>, start_row: usize) -> Self {
        let (tx, rx) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let stop = stream.stop_handle();

        thread::spawn(move || run_diff_fetch(stream, start_row, &tx, &flag));

        Self {
            rx,
            cancelled,
            stop,
            done: false,
        }
    }

    /// Drain every event available now; never blocks.
    ///
    /// Always empty after [`cancel`](Self::cancel).
    pub fn poll(&mut self) -> Vec<FetchEvent> {
        let mut events = Vec::new();
        if self.is_cancelled() {
            return events;
        }
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    if matches!(event, FetchEvent::Finished | FetchEvent::Failed(_)) {
                        self.done = true;
                    }
                    events.push(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.done = true;
                    break;
                }
            }
        }
        events
    }

    /// Block until the worker finishes and return everything it sent.
    pub fn wait(mut self) -> Vec<FetchEvent> {
        let mut events = Vec::new();
        while !self.done {
            match self.rx.recv() {
                Ok(event) => {
                    if matches!(event, FetchEvent::Finished | FetchEvent::Failed(_)) {
                        self.done = true;
                    }
                    events.push(event);
                }
                Err(_) => self.done = true,
            }
        }
        events
    }

    /// Stop the worker and its command; nothing it produces from now on is
    /// delivered.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            debug!("Diff fetch cancelled");
            if let Some(stop) = &self.stop {
                stop.stop();
            }
        }
    }

    /// `true` after [`cancel`](Self::cancel).
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// `true` once the final event has been polled.
    pub fn is_finished(&self) -> bool {
        self.done
    }
}

impl Drop for DiffFetcher {
    fn drop(&mut self) {
        if !self.done {
            self.cancel();
        }
    }
}

fn run_diff_fetch(
    mut stream: Box<dyn ByteStream>,
    start_row: usize,
    tx: &Sender<FetchEvent>,
    cancelled: &AtomicBool,
) {
    let mut parser = DiffStreamParser::with_start_row(start_row);
    let mut chunker = LineChunker::new(DIFF_SEPARATOR);
    let mut buf = vec![0u8; READ_CHUNK_SIZE];

    loop {
        if cancelled.load(Ordering::Acquire) {
            return;
        }
        let n = match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, "Reading diff output failed");
                send(tx, cancelled, FetchEvent::Failed(e.into()));
                return;
            }
        };

        if let Some(lines) = chunker.push(&buf[..n]) {
            let batch = parser.parse_chunk(&lines);
            if !batch.is_empty() && !send(tx, cancelled, FetchEvent::Batch(batch)) {
                return;
            }
        }
    }

    if let Some(rest) = chunker.finish() {
        let batch = parser.parse_chunk(&rest);
        if !batch.is_empty() && !send(tx, cancelled, FetchEvent::Batch(batch)) {
            return;
        }
    }

    let outcome = match stream.finish() {
        Ok(()) => FetchEvent::Finished,
        Err(e) => {
            warn!(error = %e, "Diff command failed");
            FetchEvent::Failed(e)
        }
    };
    send(tx, cancelled, outcome);
}

// `false` when the fetch was cancelled or the receiver is gone.
fn send<T>(tx: &Sender<T>, cancelled: &AtomicBool, event: T) -> bool {
    if cancelled.load(Ordering::Acquire) {
        return false;
    }
    tx.send(event).is_ok()
}

// ===== LogFetcher =====

/// Handle to a log fetch; the raw records arrive in one piece.
pub struct LogFetcher {
    rx: Receiver<Result<Vec<Vec<u8>>, RunnerError>>,
    cancelled: Arc<AtomicBool>,
    stop: Option<StopHandle>,
}

impl LogFetcher {
    /// Read `stream` to the end on a worker and split it into records.
    pub fn start(stream: Box<dyn ByteStream>) -> Self {
        let (tx, rx) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let stop = stream.stop_handle();

        thread::spawn(move || {
            let result = read_log(stream);
            send(&tx, &flag, result);
        });

        Self {
            rx,
            cancelled,
            stop,
        }
    }

    /// The records once the command has finished; `None` while still running.
    pub fn poll(&mut self) -> Option<Result<Vec<Vec<u8>>, RunnerError>> {
        if self.cancelled.load(Ordering::Acquire) {
            return None;
        }
        self.rx.try_recv().ok()
    }

    /// Block until the records are available.
    pub fn wait(self) -> Option<Result<Vec<Vec<u8>>, RunnerError>> {
        self.rx.recv().ok()
    }

    /// Kill the command and drop whatever the worker produces.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            if let Some(stop) = &self.stop {
                stop.stop();
            }
        }
    }
}

impl Drop for LogFetcher {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn read_log(mut stream: Box<dyn ByteStream>) -> Result<Vec<Vec<u8>>, RunnerError> {
    let mut data = Vec::new();
    stream.read_to_end(&mut data)?;
    stream.finish()?;

    let records = split_records(&data, LOG_RECORD_SEPARATOR);
    debug!(count = records.len(), bytes = data.len(), "Log fetched");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineKind;
    use crate::source::command::BufferStream;

    fn batches(events: &[FetchEvent]) -> Vec<&ParsedBatch> {
        events
            .iter()
            .filter_map(|e| match e {
                FetchEvent::Batch(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn fetch_parses_stream_and_finishes() {
        let stream = BufferStream::new("diff --git a/x.txt b/x.txt\n@@ -1 +1 @@\n-old\n+new\n");

        let events = DiffFetcher::start(Box::new(stream), 0).wait();

        let records: Vec<_> = batches(&events)
            .into_iter()
            .flat_map(|b| b.records().cloned())
            .collect();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].kind(), LineKind::File);
        assert!(matches!(events.last(), Some(FetchEvent::Finished)));
    }

    #[test]
    fn fetch_without_trailing_newline_keeps_last_line() {
        let stream = BufferStream::new("diff --git a/a b/a\n@@ -1 +1 @@\n+last");

        let events = DiffFetcher::start(Box::new(stream), 0).wait();

        let last = batches(&events)
            .into_iter()
            .flat_map(|b| b.records().cloned())
            .last()
            .unwrap();
        assert_eq!(last.raw(), b"+last");
    }

    #[test]
    fn rows_start_at_given_offset() {
        let stream = BufferStream::new("diff --git a/a b/a\n");

        let events = DiffFetcher::start(Box::new(stream), 12).wait();

        assert_eq!(batches(&events)[0].files.row("a"), Some(12));
    }

    #[test]
    fn failing_command_reports_failed_after_batches() {
        let stream = BufferStream::failing("diff --git a/a b/a\n", 128, "fatal: bad object");

        let events = DiffFetcher::start(Box::new(stream), 0).wait();

        assert_eq!(batches(&events).len(), 1);
        assert!(matches!(
            events.last(),
            Some(FetchEvent::Failed(RunnerError::ExitStatus { code: Some(128), .. }))
        ));
    }

    #[test]
    fn cancelled_fetch_delivers_nothing() {
        let stream = BufferStream::new("diff --git a/a b/a\n@@ -1 +1 @@\n+a\n");
        let mut fetcher = DiffFetcher::start(Box::new(stream), 0);

        fetcher.cancel();
        std::thread::sleep(std::time::Duration::from_millis(20));

        assert!(fetcher.poll().is_empty());
        assert!(fetcher.is_cancelled());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn cancel_kills_a_running_command() {
        use crate::source::command::{CommandRunner, GitRunner};
        use std::time::{Duration, Instant};

        let stream = GitRunner::new()
            .with_program("sh")
            .spawn(&["-c".to_string(), "exec sleep 5".to_string()])
            .unwrap();
        let pid = stream.stop_handle().expect("process stream").id();
        let proc_entry = std::path::PathBuf::from(format!("/proc/{pid}"));
        let fetcher = DiffFetcher::start(stream, 0);
        let started = Instant::now();

        fetcher.cancel();
        drop(fetcher);

        assert!(!proc_entry.exists(), "child left running or unreaped");
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn log_fetch_splits_records() {
        let stream = BufferStream::new("a\x01b\0\nc\x01d\0");

        let records = LogFetcher::start(Box::new(stream)).wait().unwrap().unwrap();

        assert_eq!(records, vec![b"a\x01b".to_vec(), b"c\x01d".to_vec()]);
    }

    #[test]
    fn log_fetch_propagates_failure() {
        let stream = BufferStream::failing("", 128, "fatal: not a git repository");

        let result = LogFetcher::start(Box::new(stream)).wait().unwrap();

        assert!(matches!(result, Err(RunnerError::ExitStatus { .. })));
    }
}

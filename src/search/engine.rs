//! Debounced background search.
//!
//! Every started search gets a new generation number. Workers tag their
//! messages with it and [`FindEngine::poll`] drops anything from an older
//! generation, so a slow search can never overwrite the results of a newer
//! query.

use super::results::{FindPart, FindResultSet, FindStatus};
use super::{compile, search_lines, FindError, FindFlags, FindMatch};
use regex::Regex;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default delay between the last keystroke and the search.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug)]
enum WorkerMessage {
    Part {
        generation: u64,
        part: FindPart,
        matches: Vec<FindMatch>,
    },
    Done {
        generation: u64,
    },
}

impl WorkerMessage {
    fn generation(&self) -> u64 {
        match self {
            WorkerMessage::Part { generation, .. } | WorkerMessage::Done { generation } => {
                *generation
            }
        }
    }
}

/// What [`FindEngine::poll`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindUpdate {
    /// Nothing arrived.
    Unchanged,
    /// Matches were merged; more may follow.
    Updated,
    /// The running search completed.
    Finished,
}

#[derive(Debug, Clone)]
struct PendingQuery {
    query: String,
    flags: FindFlags,
    deadline: Instant,
}

#[derive(Debug)]
struct RunningSearch {
    generation: u64,
    cancelled: Arc<AtomicBool>,
}

/// Debounces queries, runs them on a worker and merges the results.
#[derive(Debug)]
pub struct FindEngine {
    debounce: Duration,
    pending: Option<PendingQuery>,
    running: Option<RunningSearch>,
    generation: u64,
    tx: Sender<WorkerMessage>,
    rx: Receiver<WorkerMessage>,
    results: FindResultSet,
    active_query: Option<(String, FindFlags)>,
    error: Option<FindError>,
}

impl Default for FindEngine {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl FindEngine {
    /// Engine waiting `debounce` after the last request before searching.
    pub fn new(debounce: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            debounce,
            pending: None,
            running: None,
            generation: 0,
            tx,
            rx,
            results: FindResultSet::new(),
            active_query: None,
            error: None,
        }
    }

    // ===== Requests =====

    /// Schedule a search for `query` once `debounce` has passed since `now`.
    ///
    /// An empty query cancels everything and returns to idle.
    pub fn request(&mut self, query: &str, flags: FindFlags, now: Instant) {
        self.cancel();
        if query.is_empty() {
            self.results.clear();
            self.active_query = None;
            self.error = None;
            return;
        }
        self.pending = Some(PendingQuery {
            query: query.to_string(),
            flags,
            deadline: now + self.debounce,
        });
        self.active_query = Some((query.to_string(), flags));
    }

    /// When the scheduled search becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// `true` when a scheduled search should start.
    pub fn is_due(&self, now: Instant) -> bool {
        self.pending.as_ref().is_some_and(|p| p.deadline <= now)
    }

    /// Take the scheduled query if it is due.
    pub fn take_due(&mut self, now: Instant) -> Option<(String, FindFlags)> {
        if !self.is_due(now) {
            return None;
        }
        self.pending.take().map(|p| (p.query, p.flags))
    }

    /// Search `lines` now, visible `page` first.
    ///
    /// Cancels whatever was running. An invalid pattern clears the results
    /// and is returned; nothing is spawned.
    pub fn start(
        &mut self,
        query: &str,
        flags: FindFlags,
        lines: Vec<Arc<str>>,
        page: Range<usize>,
    ) -> Result<(), FindError> {
        self.cancel();
        self.results.clear();
        self.active_query = Some((query.to_string(), flags));
        self.generation += 1;

        let regex = match compile(query, flags) {
            Ok(regex) => regex,
            Err(e) => {
                warn!(error = %e, "Find pattern rejected");
                self.error = Some(e.clone());
                return Err(e);
            }
        };
        self.error = None;

        let generation = self.generation;
        let cancelled = Arc::new(AtomicBool::new(false));
        self.running = Some(RunningSearch {
            generation,
            cancelled: Arc::clone(&cancelled),
        });

        let tx = self.tx.clone();
        debug!(generation, lines = lines.len(), ?page, "Find started");
        thread::spawn(move || run_search(&lines, page, &regex, generation, &cancelled, &tx));
        Ok(())
    }

    /// Stop the running search and drop the scheduled one.
    ///
    /// A cancelled search never merges anything.
    pub fn cancel(&mut self) {
        self.pending = None;
        if let Some(running) = self.running.take() {
            running.cancelled.store(true, Ordering::Release);
            debug!(generation = running.generation, "Find cancelled");
        }
    }

    /// Drop the query and all results.
    pub fn reset(&mut self) {
        self.request("", FindFlags::default(), Instant::now());
    }

    // ===== Results =====

    /// Merge whatever the worker has sent; never blocks.
    pub fn poll(&mut self) -> FindUpdate {
        let mut update = FindUpdate::Unchanged;
        while let Ok(message) = self.rx.try_recv() {
            let current = self.running.as_ref().map(|r| r.generation);
            if current != Some(message.generation()) {
                debug!(
                    stale = message.generation(),
                    current = self.generation,
                    "Discarding stale find results"
                );
                continue;
            }

            match message {
                WorkerMessage::Part { part, matches, .. } => {
                    let current = (part == FindPart::CurrentPage).then_some(0);
                    self.results.merge(part, matches, current);
                    update = FindUpdate::Updated;
                }
                WorkerMessage::Done { generation } => {
                    debug!(generation, matches = self.results.len(), "Find finished");
                    self.running = None;
                    update = FindUpdate::Finished;
                }
            }
        }
        update
    }

    /// Block until the running search finishes or `timeout` passes.
    pub fn wait(&mut self, timeout: Duration) -> FindUpdate {
        let deadline = Instant::now() + timeout;
        let mut last = FindUpdate::Unchanged;
        while self.running.is_some() && Instant::now() < deadline {
            match self.poll() {
                FindUpdate::Finished => return FindUpdate::Finished,
                FindUpdate::Updated => last = FindUpdate::Updated,
                FindUpdate::Unchanged => thread::sleep(Duration::from_millis(1)),
            }
        }
        last
    }

    /// Current results.
    pub fn results(&self) -> &FindResultSet {
        &self.results
    }

    /// Current results, for navigation.
    pub fn results_mut(&mut self) -> &mut FindResultSet {
        &mut self.results
    }

    /// Query of the scheduled or last started search.
    pub fn query(&self) -> Option<&str> {
        self.active_query.as_ref().map(|(q, _)| q.as_str())
    }

    /// Flags of the scheduled or last started search.
    pub fn flags(&self) -> Option<FindFlags> {
        self.active_query.as_ref().map(|(_, f)| *f)
    }

    /// Pattern error of the last started search.
    pub fn error(&self) -> Option<&FindError> {
        self.error.as_ref()
    }

    /// `true` while a search is scheduled or running.
    pub fn is_searching(&self) -> bool {
        self.pending.is_some() || self.running.is_some()
    }

    /// What to show in the find bar.
    pub fn status(&self) -> FindStatus {
        if self.active_query.is_none() {
            return FindStatus::Idle;
        }
        if self.error.is_some() {
            return FindStatus::NoResults;
        }
        self.results.status(self.is_searching())
    }

    /// Advance to the next match.
    pub fn next(&mut self) -> Option<FindMatch> {
        self.results.next()
    }

    /// Step back to the previous match.
    pub fn previous(&mut self) -> Option<FindMatch> {
        self.results.previous()
    }
}

impl Drop for FindEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run_search(
    lines: &[Arc<str>],
    page: Range<usize>,
    regex: &Regex,
    generation: u64,
    cancelled: &AtomicBool,
    tx: &Sender<WorkerMessage>,
) {
    let stop = || cancelled.load(Ordering::Acquire);
    let len = lines.len();
    let page = page.start.min(len)..page.end.min(len);

    let parts = [
        (FindPart::CurrentPage, page.clone()),
        (FindPart::BeforeCurPage, 0..page.start),
        (FindPart::AfterCurPage, page.end..len),
    ];
    for (part, range) in parts {
        let Some(matches) = search_lines(lines, range, regex, stop) else {
            return;
        };
        if stop() {
            return;
        }
        let message = WorkerMessage::Part {
            generation,
            part,
            matches,
        };
        if tx.send(message).is_err() {
            return;
        }
    }

    if !stop() {
        let _ = tx.send(WorkerMessage::Done { generation });
    }
}

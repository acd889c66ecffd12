//! Application state and transitions.
//!
//! AppState is the root of all UI state: the log pane, the diff pane, the
//! find bar and which pane has focus. It owns the command runner, so loading
//! a diff is a state transition like any other; the terminal shell only
//! forwards events and paints.
//!
//! # State Machine
//!
//! - **Focus**: Log → Files → Diff → Log (Tab); Find is entered via `/`
//! - **Find**: Inactive → Typing → Active → Inactive (see [`FindInput`])
//! - **Diff target**: the current log row, or a local-changes sentinel when
//!   launched with `--cached` / `--working-tree`

use crate::config::{IgnoreWhitespace, KeyBindings, RenderConfig, ResolvedConfig};
use crate::model::Commit;
use crate::search::{FindFlags, FindStatus};
use crate::source::{log_args, CommandRunner, DiffRequest, DiffTarget, LogFetcher};
use crate::state::{
    DiffViewState, FetchProgress, FindInput, HighlightField, KeywordHighlight, LogViewState,
};
use crate::view_state::ClickTracker;
use regex::Regex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{info, warn};

// ===== LaunchOptions =====

/// What to show, as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Revision whose log is listed; `None` lists `HEAD`.
    pub revision: Option<String>,
    /// Restrict log and diffs to these paths.
    pub paths: Vec<String>,
    /// Show local changes instead of the first commit.
    pub local_changes: Option<DiffTarget>,
    /// Query to search for once the first diff is loaded.
    pub find: Option<String>,
    /// Regex highlighted in every diff shown.
    pub highlight: Option<String>,
    /// Lines [`highlight`](Self::highlight) applies to.
    pub highlight_field: HighlightField,
}

fn keyword_highlight(launch: &LaunchOptions) -> Option<KeywordHighlight> {
    let pattern = launch.highlight.as_deref().filter(|p| !p.is_empty())?;
    match Regex::new(pattern) {
        Ok(pattern) => Some(KeywordHighlight {
            pattern,
            field: launch.highlight_field,
        }),
        Err(e) => {
            warn!(error = %e, pattern, "Ignoring invalid highlight pattern");
            None
        }
    }
}

// ===== AppState =====

/// Application state.
pub struct AppState {
    runner: Box<dyn CommandRunner>,
    config: ResolvedConfig,
    render: RenderConfig,
    launch: LaunchOptions,
    bindings: KeyBindings,

    /// Commit list.
    pub log: LogViewState,
    /// Patch of the selected commit.
    pub diff: DiffViewState,
    /// Which pane receives keys.
    pub focus: FocusPane,
    /// Pane focused before the find bar opened.
    pub focus_before_find: FocusPane,
    /// Find bar.
    pub find_input: FindInput,
    /// Selected row of the file list.
    pub file_selection: usize,
    /// Press counting for the diff pane.
    pub clicks: ClickTracker,
    /// `true` while a drag started in the diff pane.
    pub dragging: bool,
    /// Set when the user asked to exit.
    pub should_quit: bool,

    log_fetch: Option<LogFetcher>,
    status: Option<String>,
    pending_find: Option<String>,
}

impl AppState {
    /// State with empty panes; call [`start`](Self::start) to load the log.
    pub fn new(
        runner: Box<dyn CommandRunner>,
        config: ResolvedConfig,
        render: RenderConfig,
        launch: LaunchOptions,
    ) -> Self {
        let debounce = Duration::from_millis(config.find_debounce_ms);
        let click_interval = Duration::from_millis(config.double_click_ms);
        let pending_find = launch.find.clone().filter(|q| !q.is_empty());
        let mut diff = DiffViewState::new(render, debounce);
        diff.set_highlight(keyword_highlight(&launch));
        Self {
            runner,
            diff,
            config,
            render,
            launch,
            bindings: KeyBindings::default(),
            log: LogViewState::new(),
            focus: FocusPane::Log,
            focus_before_find: FocusPane::Log,
            find_input: FindInput::Inactive,
            file_selection: 0,
            clicks: ClickTracker::new(click_interval),
            dragging: false,
            should_quit: false,
            log_fetch: None,
            status: None,
            pending_find,
        }
    }

    /// Key bindings in effect.
    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Resolved configuration, including runtime toggles.
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Render settings in effect.
    pub fn render_config(&self) -> RenderConfig {
        self.render
    }

    /// One-line status for the footer: stream failures and loading notes.
    pub fn status(&self) -> Option<&str> {
        self.diff.notice().or(self.status.as_deref())
    }

    /// `true` while the log is being fetched.
    pub fn is_loading_log(&self) -> bool {
        self.log_fetch.is_some()
    }

    // ===== Loading =====

    /// Start fetching the log.
    pub fn start(&mut self) {
        let args = log_args(self.launch.revision.as_deref(), &self.launch.paths);
        match self.runner.spawn(&args) {
            Ok(stream) => {
                self.status = Some("Loading log...".to_string());
                self.log_fetch = Some(LogFetcher::start(stream));
            }
            Err(e) => {
                warn!(error = %e, "Could not start log command");
                self.status = Some(e.to_string());
            }
        }
    }

    /// Drain worker output. Returns `true` when anything visible changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut changed = self.poll_log();

        match self.diff.poll_fetch() {
            FetchProgress::Idle => {}
            FetchProgress::Appended(_) => changed = true,
            FetchProgress::Finished | FetchProgress::Failed(_) => {
                changed = true;
                if let Some(query) = self.pending_find.take() {
                    self.open_find_with(query, now);
                }
            }
        }
        changed |= self.diff.tick_find(now);
        if changed {
            self.sync_file_selection();
        }
        changed
    }

    fn poll_log(&mut self) -> bool {
        let Some(fetcher) = self.log_fetch.as_mut() else {
            return false;
        };
        let Some(outcome) = fetcher.poll() else {
            return false;
        };
        self.log_fetch = None;
        self.status = None;

        match outcome {
            Ok(records) => {
                info!(commits = records.len(), "Log loaded");
                self.log.set_records(records);
                match self.launch.local_changes.clone() {
                    Some(target) => self.show_local_changes(target),
                    None => {
                        if self.log.set_current_index(Some(0)) {
                            self.load_current_diff();
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Log command failed");
                self.status = Some(e.to_string());
            }
        }
        true
    }

    /// Show the diff of the current log row.
    pub fn load_current_diff(&mut self) {
        let Some(commit) = self.log.current_commit() else {
            self.diff.clear();
            return;
        };
        let target = DiffTarget::Commit(commit.sha1.clone());
        self.show(commit, target);
    }

    /// Show staged or unstaged changes on top of the first log row.
    pub fn show_local_changes(&mut self, target: DiffTarget) {
        let parents = match self.log.commit_at(0) {
            Some(head) => vec![head.sha1.clone()],
            None => Vec::new(),
        };
        let sentinel = Commit {
            parents,
            ..Commit::default()
        };
        self.show(sentinel, target);
    }

    /// Re-run the current diff, e.g. after a whitespace mode change.
    pub fn reload_diff(&mut self) {
        match self.diff.target().cloned() {
            Some(DiffTarget::Commit(_)) => self.load_current_diff(),
            Some(local) => self.show_local_changes(local),
            None => {}
        }
    }

    fn show(&mut self, commit: Commit, target: DiffTarget) {
        let mut related = commit.parents.clone();
        related.extend(commit.children.iter().cloned());
        let subjects: HashMap<String, String> = self.log.subjects_of(&related);

        self.diff
            .show_commit(&commit, target.clone(), |sha1| subjects.get(sha1).cloned());
        self.file_selection = 0;

        let mut request = DiffRequest::new(target);
        request.paths = self.launch.paths.clone();
        request.context_lines = self.config.context_lines;
        if let Some(arg) = self.config.ignore_whitespace.diff_arg() {
            request.extra_args.push(arg.to_string());
        }

        match self.runner.spawn(&request.args()) {
            Ok(stream) => self.diff.begin_fetch(stream),
            Err(e) => {
                warn!(error = %e, "Could not start diff command");
                self.status = Some(e.to_string());
            }
        }

        // matches refer to the old lines
        if let Some(query) = self.find_input.query().map(str::to_string) {
            if !query.is_empty() {
                self.pending_find = Some(query);
            }
        }
        self.diff.close_find();
    }

    // ===== Focus =====

    /// Cycle Log → Files → Diff → Log. Leaves the find bar first.
    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::Log => FocusPane::Files,
            FocusPane::Files => FocusPane::Diff,
            FocusPane::Diff => FocusPane::Log,
            FocusPane::Find => self.focus_before_find,
        };
    }

    // ===== Files =====

    /// File list entries in diff order.
    pub fn file_entries(&self) -> Vec<(&str, usize)> {
        self.diff.files().iter().collect()
    }

    /// Select file `index` and scroll the diff to it.
    pub fn select_file(&mut self, index: usize) {
        let Some(path) = self
            .diff
            .files()
            .iter()
            .nth(index)
            .map(|(path, _)| path.to_string())
        else {
            return;
        };
        self.file_selection = index;
        self.diff.goto_file(&path);
    }

    /// Point the file list at the block the diff is scrolled to.
    pub fn sync_file_selection(&mut self) {
        let row = self
            .diff
            .file_row_for_line(self.diff.lines().first_visible_line());
        if let Some(index) = self.diff.files().iter().position(|(_, r)| r == row) {
            self.file_selection = index;
        }
    }

    // ===== Find =====

    /// Open the find bar, optionally pre-filled, and search as typed.
    pub fn open_find(&mut self, prefill: Option<String>, now: Instant) {
        if self.focus != FocusPane::Find {
            self.focus_before_find = self.focus;
        }
        self.find_input = crate::state::find_input::handle_open(
            std::mem::take(&mut self.find_input),
            prefill,
        );
        self.focus = FocusPane::Find;
        self.request_find(now);
    }

    fn open_find_with(&mut self, query: String, now: Instant) {
        let flags = self.find_input.flags().unwrap_or_default();
        self.find_input = FindInput::Active { query, flags };
        self.request_find(now);
    }

    /// Schedule a search for the find bar's current query.
    pub fn request_find(&mut self, now: Instant) {
        let query = self.find_input.query().unwrap_or_default().to_string();
        let flags = self.find_input.flags().unwrap_or_default();
        self.diff.request_find(&query, flags, now);
    }

    /// Close the find bar and drop the matches.
    pub fn close_find(&mut self) {
        self.find_input = FindInput::Inactive;
        self.diff.close_find();
        if self.focus == FocusPane::Find {
            self.focus = self.focus_before_find;
        }
    }

    /// Find bar status line.
    pub fn find_status(&self) -> FindStatus {
        self.diff.find_status()
    }

    /// Options shown in the find bar.
    pub fn find_flags(&self) -> FindFlags {
        self.find_input.flags().unwrap_or_default()
    }

    // ===== Display toggles =====

    /// Next whitespace mode; reloads the diff.
    pub fn cycle_whitespace(&mut self) {
        self.config.ignore_whitespace = self.config.ignore_whitespace.cycle();
        info!(mode = ?self.config.ignore_whitespace, "Whitespace mode changed");
        self.reload_diff();
    }

    /// Whitespace mode in effect.
    pub fn ignore_whitespace(&self) -> IgnoreWhitespace {
        self.config.ignore_whitespace
    }

    /// Toggle whitespace markers.
    pub fn toggle_show_whitespace(&mut self) {
        self.render.show_whitespace = !self.render.show_whitespace;
        self.config.show_whitespace = self.render.show_whitespace;
        self.diff.update_config(self.render);
    }
}

// ===== FocusPane =====

/// Pane receiving keyboard input.
///
/// The find bar is not part of the Tab cycle; it is entered with `/` and
/// returns focus to the pane it was opened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    /// Commit list.
    Log,
    /// Files touched by the shown commit.
    Files,
    /// Patch text.
    Diff,
    /// Find bar input.
    Find,
}

#[cfg(test)]
#[path = "app_state_tests.rs"]
mod tests;

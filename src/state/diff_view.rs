//! Diff view state.
//!
//! Owns everything one diff pane shows: the line store, the file index, the
//! selection, the find engine and at most one in-flight fetch. Background
//! workers only ever hand over finished batches; all mutation happens here,
//! on the UI thread.

use crate::config::RenderConfig;
use crate::encoding;
use crate::model::{Commit, FileRowIndex, LineKind, LineRecord, TextPosition};
use crate::parser::ParsedBatch;
use crate::search::{FindEngine, FindFlags, FindMatch, FindStatus, FindUpdate};
use crate::source::{ByteStream, DiffFetcher, DiffTarget, FetchEvent};
use crate::view_state::{ClickKind, FormatKind, FormatRange, LineStore, SourceLine, TextCursor};
use encoding_rs::Encoding;
use regex::Regex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// File index entry pointing at the commit message.
pub const COMMENTS_ENTRY: &str = "Comments";

// ===== Keyword highlight =====

/// Which lines a keyword highlight applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightField {
    /// Commit message lines.
    Comments,
    /// Added or removed diff lines.
    Changes,
    /// Every line.
    #[default]
    All,
}

/// Extra highlight for lines matching a pattern, e.g. the log filter.
#[derive(Debug, Clone)]
pub struct KeywordHighlight {
    /// Pattern to highlight.
    pub pattern: Regex,
    /// Lines it applies to.
    pub field: HighlightField,
}

impl KeywordHighlight {
    /// `true` when lines of `kind` with `text` are eligible.
    pub fn applies_to(&self, kind: LineKind, text: &str) -> bool {
        match self.field {
            HighlightField::All => true,
            HighlightField::Comments => kind == LineKind::Text,
            HighlightField::Changes => {
                kind.is_diff_content() && text.trim_start().starts_with(['+', '-'])
            }
        }
    }

    /// Highlight ranges of `text` in char columns.
    pub fn ranges(&self, kind: LineKind, text: &str) -> Vec<FormatRange> {
        if !self.applies_to(kind, text) {
            return Vec::new();
        }
        self.pattern
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| {
                let start = text[..m.start()].chars().count();
                let len = m.as_str().chars().count();
                FormatRange {
                    start,
                    len,
                    kind: FormatKind::Highlight,
                }
            })
            .collect()
    }
}

// ===== Fetch progress =====

/// What [`DiffViewState::poll_fetch`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchProgress {
    /// No fetch or nothing new.
    Idle,
    /// Lines were appended; the fetch continues.
    Appended(usize),
    /// The fetch completed.
    Finished,
    /// The command failed; the message is also kept as [`DiffViewState::notice`].
    Failed(String),
}

// ===== DiffViewState =====

/// State of the diff pane.
#[derive(Debug)]
pub struct DiffViewState {
    lines: LineStore,
    files: FileRowIndex,
    cursor: TextCursor,
    find: FindEngine,
    fetcher: Option<FetchHandle>,
    config: RenderConfig,
    last_encoding: Option<&'static Encoding>,
    highlight: Option<KeywordHighlight>,
    target: Option<DiffTarget>,
    notice: Option<String>,
    h_offset: usize,
    viewport_width: usize,
}

// `DiffFetcher` holds a boxed worker stream and has no Debug.
struct FetchHandle(DiffFetcher);

impl std::fmt::Debug for FetchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffFetcher")
            .field("finished", &self.0.is_finished())
            .finish()
    }
}

impl Default for DiffViewState {
    fn default() -> Self {
        Self::new(RenderConfig::default(), Duration::from_millis(200))
    }
}

impl DiffViewState {
    /// Empty view.
    pub fn new(config: RenderConfig, find_debounce: Duration) -> Self {
        Self {
            lines: LineStore::new(Default::default(), config),
            files: FileRowIndex::new(),
            cursor: TextCursor::new(config),
            find: FindEngine::new(find_debounce),
            fetcher: None,
            config,
            last_encoding: None,
            highlight: None,
            target: None,
            notice: None,
            h_offset: 0,
            viewport_width: 0,
        }
    }

    // ===== Accessors =====

    /// Lines shown.
    pub fn lines(&self) -> &LineStore {
        &self.lines
    }

    /// File path → row.
    pub fn files(&self) -> &FileRowIndex {
        &self.files
    }

    /// Selection.
    pub fn cursor(&self) -> &TextCursor {
        &self.cursor
    }

    /// Find engine.
    pub fn find(&self) -> &FindEngine {
        &self.find
    }

    /// Target of the current diff.
    pub fn target(&self) -> Option<&DiffTarget> {
        self.target.as_ref()
    }

    /// Last stream failure, shown until the next commit is loaded.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// `true` while a fetch is running.
    pub fn is_loading(&self) -> bool {
        self.fetcher.is_some()
    }

    /// Columns scrolled off to the left.
    pub fn h_offset(&self) -> usize {
        self.h_offset
    }

    /// Current render settings.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    // ===== Content =====

    /// Drop all content and cancel the running fetch and search.
    pub fn clear(&mut self) {
        self.cancel_fetch();
        self.lines.clear();
        self.files.clear();
        self.cursor.move_to(TextPosition::default());
        self.find.cancel();
        self.find.results_mut().clear();
        self.last_encoding = None;
        self.notice = None;
        self.h_offset = 0;
    }

    /// Replace the content with the header of `commit`.
    ///
    /// `subject_of` supplies the one-line summary shown next to parent and
    /// child sha1s, when known. Patch output is added by
    /// [`begin_fetch`](Self::begin_fetch).
    pub fn show_commit<F>(&mut self, commit: &Commit, target: DiffTarget, subject_of: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.clear();
        self.files.insert(COMMENTS_ENTRY, 0);

        let describe = |sha1: &str| match subject_of(sha1) {
            Some(subject) => format!("{sha1} ({subject})"),
            None => sha1.to_string(),
        };

        if !target.is_local_changes() {
            self.push_text(
                LineKind::Author,
                format!("Author: {} {}", commit.author, commit.author_date),
            );
            self.push_text(
                LineKind::Author,
                format!("Committer: {} {}", commit.committer, commit.committer_date),
            );
        }
        for parent in &commit.parents {
            self.push_text(
                LineKind::Sha1 { is_parent: true },
                format!("Parent: {}", describe(parent)),
            );
        }
        for child in &commit.children {
            self.push_text(
                LineKind::Sha1 { is_parent: false },
                format!("Child: {}", describe(child)),
            );
        }
        self.push_text(LineKind::Text, String::new());

        let comments = match target.description() {
            Some(description) if commit.comments.is_empty() => description.to_string(),
            _ => commit.comments.clone(),
        };
        for comment in comments.split('\n') {
            let line = if comment.is_empty() {
                String::new()
            } else {
                format!("    {comment}")
            };
            self.push_text(LineKind::Text, line);
        }
        self.push_text(LineKind::Text, String::new());

        self.target = Some(target);
    }

    fn push_text(&mut self, kind: LineKind, text: String) {
        self.lines.append(SourceLine::new(kind, text));
    }

    /// Start appending the patch from `stream` after the current lines.
    ///
    /// Any fetch still running is cancelled first; its undelivered output is
    /// dropped.
    pub fn begin_fetch(&mut self, stream: Box<dyn ByteStream>) {
        self.cancel_fetch();
        self.notice = None;
        self.last_encoding = None;
        let start_row = self.lines.len();
        debug!(start_row, "Diff fetch started");
        self.fetcher = Some(FetchHandle(DiffFetcher::start(stream, start_row)));
    }

    /// Cancel the running fetch, if any.
    pub fn cancel_fetch(&mut self) {
        if let Some(FetchHandle(fetcher)) = self.fetcher.take() {
            fetcher.cancel();
        }
    }

    /// Append whatever the fetch worker has produced.
    pub fn poll_fetch(&mut self) -> FetchProgress {
        let Some(FetchHandle(fetcher)) = self.fetcher.as_mut() else {
            return FetchProgress::Idle;
        };

        let mut appended = 0;
        let mut outcome = None;
        for event in fetcher.poll() {
            match event {
                FetchEvent::Batch(batch) => appended += self.apply_batch(batch),
                FetchEvent::Finished => outcome = Some(FetchProgress::Finished),
                FetchEvent::Failed(e) => {
                    warn!(error = %e, "Diff stream failed");
                    let message = e.to_string();
                    self.notice = Some(message.clone());
                    outcome = Some(FetchProgress::Failed(message));
                }
            }
        }

        match outcome {
            Some(progress) => {
                self.fetcher = None;
                if progress == FetchProgress::Finished {
                    info!(lines = self.lines.len(), files = self.files.len(), "Diff loaded");
                }
                progress
            }
            None if appended > 0 => FetchProgress::Appended(appended),
            None => FetchProgress::Idle,
        }
    }

    /// Decode and append a parsed batch; returns the number of lines added.
    ///
    /// Diff content decodes with the encoding that worked for the previous
    /// diff line, so one hunk in a legacy encoding does not pay for the
    /// fallback chain on every line.
    ///
    /// A batch whose rows do not start at the end of the store is re-based
    /// onto it, file rows included, so the file index always points at the
    /// lines actually stored.
    pub fn apply_batch(&mut self, batch: ParsedBatch) -> usize {
        let ParsedBatch { lines, files } = batch;
        let base = self.lines.len();
        let first = lines.first().map_or(base, |(row, _)| *row);
        if first != base {
            warn!(
                expected = base,
                got = first,
                "Batch rows out of step with the line store, re-basing"
            );
        }

        let count = lines.len();
        for (_, record) in lines {
            let line = self.decode_record(record);
            self.lines.append(line);
        }
        for (path, row) in files.into_entries() {
            self.files.insert(path, row.saturating_sub(first) + base);
        }
        count
    }

    fn decode_record(&mut self, record: LineRecord) -> SourceLine {
        let kind = record.kind();
        let preferred = self.config.preferred_encoding;
        if kind.is_diff_content() {
            let decoded = encoding::decode(record.raw(), self.last_encoding.unwrap_or(preferred));
            if decoded.encoding.is_some() {
                self.last_encoding = decoded.encoding;
            }
            SourceLine::decoded(kind, decoded.text, decoded.encoding)
        } else {
            self.last_encoding = None;
            let decoded = encoding::decode(record.raw(), preferred);
            SourceLine::decoded(kind, decoded.text, decoded.encoding)
        }
    }

    /// Row of the file block containing `line`.
    ///
    /// Scans backwards for a `File` line; meeting the commit header first
    /// means the line belongs to the message, which lives at row 0.
    pub fn file_row_for_line(&self, line: usize) -> usize {
        let last = line.min(self.lines.len().saturating_sub(1));
        for row in (0..=last).rev() {
            let Some(source) = self.lines.line(row) else {
                continue;
            };
            match source.kind() {
                LineKind::File => return row,
                kind if kind.is_commit_header() => return 0,
                _ => {}
            }
        }
        0
    }

    /// File index entry for the block containing the first visible line.
    pub fn current_file(&self) -> Option<&str> {
        let row = self.file_row_for_line(self.lines.first_visible_line());
        self.files.path_at_row(row)
    }

    /// Scroll to the block of `path`.
    pub fn goto_file(&mut self, path: &str) -> bool {
        match self.files.row(path) {
            Some(row) => {
                self.lines.goto_line(row);
                true
            }
            None => false,
        }
    }

    // ===== Settings =====

    /// Apply new render settings to store and cursor.
    pub fn update_config(&mut self, config: RenderConfig) {
        self.config = config;
        self.lines.update_config(config);
        self.cursor.update_config(config);
    }

    /// Set or drop the keyword highlight.
    pub fn set_highlight(&mut self, highlight: Option<KeywordHighlight>) {
        self.highlight = highlight;
    }

    // ===== Viewport =====

    /// Record the pane size in cells.
    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.viewport_width = width;
        self.lines.set_viewport(height, 1);
        self.clamp_h_offset();
    }

    /// Scroll vertically by `delta` lines.
    pub fn scroll_by(&mut self, delta: isize) {
        self.lines.scroll_by(delta);
    }

    /// Scroll to the first line.
    pub fn scroll_to_top(&mut self) {
        self.lines.goto_line(0);
    }

    /// Scroll to the last page.
    pub fn scroll_to_bottom(&mut self) {
        self.lines.goto_line(usize::MAX);
    }

    /// Whole lines per page.
    pub fn page_height(&self) -> usize {
        self.lines.lines_per_page()
    }

    /// Scroll horizontally by `delta` columns.
    pub fn scroll_horizontal(&mut self, delta: isize) {
        self.h_offset = self.h_offset.saturating_add_signed(delta);
        self.clamp_h_offset();
    }

    fn clamp_h_offset(&mut self) {
        let height = self.lines.lines_per_page();
        let extents = self.lines.scroll_extents(self.viewport_width, height, 1);
        self.h_offset = self.h_offset.min(extents.horizontal);
    }

    /// Measure newly visible lines; call before painting.
    pub fn prepare_paint(&mut self) {
        self.clamp_h_offset();
    }

    // ===== Selection =====

    /// Handle a press at cell (`x`, `y`) of the pane.
    pub fn click(&mut self, x: usize, y: usize, kind: ClickKind, extend: bool) {
        let Some(line) = self.lines.line_at_y(y) else {
            return;
        };
        let pos = self.position_at(line, x);
        let text = self.lines.text(line).unwrap_or_default();
        match kind {
            ClickKind::Single if extend => self.cursor.select_to(pos),
            ClickKind::Single => self.cursor.move_to(pos),
            ClickKind::Double => self.cursor.select_word(pos, text),
            ClickKind::Triple => {
                let len = text.chars().count();
                self.cursor.select_line(line, len);
            }
        }
    }

    /// Extend the selection to cell (`x`, `y`) while dragging.
    ///
    /// Dragging past the top or bottom edge scrolls one line.
    pub fn drag(&mut self, x: usize, y: isize) {
        if y < 0 {
            self.lines.scroll_by(-1);
        } else if y as usize >= self.lines.lines_per_page() {
            self.lines.scroll_by(1);
        }
        let y = y.clamp(0, self.lines.lines_per_page().saturating_sub(1) as isize) as usize;
        let line = match self.lines.line_at_y(y) {
            Some(line) => line,
            None if !self.lines.is_empty() => self.lines.len() - 1,
            None => return,
        };
        let pos = self.position_at(line, x);
        self.cursor.select_to(pos);
    }

    fn position_at(&self, line: usize, x: usize) -> TextPosition {
        let text = self.lines.text(line).unwrap_or_default();
        self.cursor
            .position_at(line, text, x + self.h_offset, self.lines.measure())
    }

    /// Select every line.
    pub fn select_all(&mut self) {
        let count = self.lines.len();
        let last_len = count
            .checked_sub(1)
            .and_then(|i| self.lines.line(i))
            .map_or(0, SourceLine::char_len);
        self.cursor.select_all(count, last_len);
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) {
        self.cursor.clear();
    }

    /// Selected part of the first selected line.
    pub fn selected_text_first_line(&self) -> Option<String> {
        let text = self.lines.text(self.cursor.begin().line)?;
        self.cursor.selected_text_first_line(text)
    }

    // ===== Find =====

    /// Schedule a search after the debounce delay.
    pub fn request_find(&mut self, query: &str, flags: FindFlags, now: Instant) {
        self.find.request(query, flags, now);
    }

    /// Start the scheduled search if it is due and merge worker output.
    ///
    /// Returns `true` when the results changed.
    pub fn tick_find(&mut self, now: Instant) -> bool {
        if let Some((query, flags)) = self.find.take_due(now) {
            let page = self.lines.current_window();
            // pattern errors are logged and surface as NoResults
            let _ = self.find.start(&query, flags, self.lines.text_snapshot(), page);
        }

        match self.find.poll() {
            FindUpdate::Unchanged => false,
            FindUpdate::Updated => true,
            FindUpdate::Finished => {
                self.adopt_selected_match();
                true
            }
        }
    }

    // A single-line selection equal to a match makes that match current.
    fn adopt_selected_match(&mut self) {
        if !self.cursor.has_selection() || self.cursor.has_multi_line() {
            return;
        }
        let (begin, end) = (self.cursor.begin(), self.cursor.end());
        let target = FindMatch::new(begin.line, begin.column, end.column);
        self.find.results_mut().select_match(target);
    }

    /// Move to the next match, selecting it and scrolling it into view.
    pub fn next_match(&mut self) -> Option<FindMatch> {
        let found = self.find.next()?;
        self.reveal_match(found);
        Some(found)
    }

    /// Move to the previous match.
    pub fn previous_match(&mut self) -> Option<FindMatch> {
        let found = self.find.previous()?;
        self.reveal_match(found);
        Some(found)
    }

    /// Select the current match and scroll to it.
    pub fn reveal_current_match(&mut self) -> Option<FindMatch> {
        let found = self.find.results().current()?;
        self.reveal_match(found);
        Some(found)
    }

    fn reveal_match(&mut self, found: FindMatch) {
        self.cursor
            .move_to(TextPosition::new(found.line, found.start));
        self.cursor.select_to(TextPosition::new(found.line, found.end));
        self.lines.ensure_visible(found.line);
    }

    /// Stop searching and drop the results.
    pub fn close_find(&mut self) {
        self.find.reset();
    }

    /// Find bar status.
    pub fn find_status(&self) -> FindStatus {
        self.find.status()
    }

    // ===== Painting =====

    /// Format ranges for `line`: keyword highlights, find matches, selection.
    ///
    /// Later ranges win where they overlap.
    pub fn format_ranges(&self, line: usize, focused: bool) -> Vec<FormatRange> {
        let Some(source) = self.lines.line(line) else {
            return Vec::new();
        };
        let mut ranges = match &self.highlight {
            Some(highlight) => highlight.ranges(source.kind(), source.text()),
            None => Vec::new(),
        };

        let current = self.find.results().current();
        ranges.extend(self.find.results().matches_on_line(line).iter().map(|m| {
            FormatRange::span(
                m.start,
                m.end,
                FormatKind::FindMatch {
                    current: Some(*m) == current,
                },
            )
        }));

        if let Some((start, end)) = self
            .cursor
            .selection_range_for_line(line, source.char_len())
        {
            ranges.push(FormatRange::span(start, end, FormatKind::Selection { focused }));
        }
        ranges
    }
}

#[cfg(test)]
#[path = "diff_view_tests.rs"]
mod tests;

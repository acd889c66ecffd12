//! Log pane state: a cursor over the lazily parsed commit list.

use crate::log_loader::LazyLogLoader;
use crate::model::Commit;
use std::collections::HashMap;
use std::ops::Range;
use tracing::debug;

/// Commit list with a current row and a scroll offset.
#[derive(Debug, Default)]
pub struct LogViewState {
    loader: LazyLogLoader,
    current: Option<usize>,
    first_visible: usize,
    viewport_height: usize,
}

impl LogViewState {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the log with `records`; nothing is current afterwards.
    pub fn set_records(&mut self, records: Vec<Vec<u8>>) {
        debug!(commits = records.len(), "Log replaced");
        self.loader.set_source(records);
        self.current = None;
        self.first_visible = 0;
    }

    /// Number of commits.
    pub fn len(&self) -> usize {
        self.loader.len()
    }

    /// `true` without commits.
    pub fn is_empty(&self) -> bool {
        self.loader.is_empty()
    }

    /// Backing loader.
    pub fn loader(&self) -> &LazyLogLoader {
        &self.loader
    }

    /// Commit at `index`, parsed on demand.
    pub fn commit_at(&mut self, index: usize) -> Option<&Commit> {
        self.loader.get(index)
    }

    /// Commit at `index` if already parsed; see [`materialize_visible`](Self::materialize_visible).
    pub fn peek(&self, index: usize) -> Option<&Commit> {
        self.loader.peek(index)
    }

    /// Parse every commit on screen so painting can use [`peek`](Self::peek).
    pub fn materialize_visible(&mut self) {
        for row in self.visible_rows() {
            self.loader.get(row);
        }
    }

    // ===== Current row =====

    /// Current row, if any.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Make `index` current and scroll it into view.
    ///
    /// Out-of-range indices clear the current row. Returns `true` when the
    /// current row changed.
    pub fn set_current_index(&mut self, index: Option<usize>) -> bool {
        let index = index.filter(|&i| i < self.len());
        if index == self.current {
            return false;
        }
        self.current = index;
        if let Some(index) = index {
            self.ensure_visible(index);
        }
        true
    }

    /// Move the current row by `delta`, clamped to the log.
    pub fn move_current(&mut self, delta: isize) -> bool {
        if self.is_empty() {
            return false;
        }
        let target = match self.current {
            Some(current) => current.saturating_add_signed(delta).min(self.len() - 1),
            None => 0,
        };
        self.set_current_index(Some(target))
    }

    /// Current commit with its children filled in.
    pub fn current_commit(&mut self) -> Option<Commit> {
        let index = self.current?;
        let children = self.loader.children_of(index);
        let mut commit = self.loader.get(index)?.clone();
        commit.children = children;
        Some(commit)
    }

    /// Make the first commit whose sha1 starts with `prefix` current.
    ///
    /// Returns `false` when no commit matches. When the current commit
    /// already matches nothing is scanned.
    pub fn switch_to_commit(&mut self, prefix: &str) -> bool {
        if prefix.is_empty() {
            return false;
        }
        if let Some(current) = self.current {
            if self
                .loader
                .get(current)
                .is_some_and(|c| c.sha1.starts_with(prefix))
            {
                return true;
            }
        }
        match self.loader.find_by_sha1_prefix(prefix) {
            Some(index) => {
                self.set_current_index(Some(index));
                true
            }
            None => {
                debug!(prefix, "No commit matches prefix");
                false
            }
        }
    }

    /// Sha1s of the commits that list the commit at `index` as a parent.
    pub fn children_of(&mut self, index: usize) -> Vec<String> {
        self.loader.children_of(index)
    }

    /// Subjects of the commits named by `sha1s`, for those in the log.
    pub fn subjects_of(&mut self, sha1s: &[String]) -> HashMap<String, String> {
        let mut subjects = HashMap::new();
        for sha1 in sha1s {
            if let Some(index) = self.loader.find_by_sha1_prefix(sha1) {
                if let Some(commit) = self.loader.get(index) {
                    subjects.insert(sha1.clone(), commit.summary().to_string());
                }
            }
        }
        subjects
    }

    // ===== Viewport =====

    /// Record the pane height in rows.
    ///
    /// A new height scrolls the current row back into view; repeating the
    /// same height keeps a wheel-scrolled position.
    pub fn set_viewport(&mut self, height: usize) {
        if height == self.viewport_height {
            return;
        }
        self.viewport_height = height;
        if let Some(current) = self.current {
            self.ensure_visible(current);
        }
    }

    /// First row drawn.
    pub fn first_visible_row(&self) -> usize {
        self.first_visible
    }

    /// Rows currently on screen.
    pub fn visible_rows(&self) -> Range<usize> {
        let end = (self.first_visible + self.viewport_height).min(self.len());
        self.first_visible.min(end)..end
    }

    /// Scroll the minimum needed for `index` to be on screen.
    pub fn ensure_visible(&mut self, index: usize) {
        let height = self.viewport_height.max(1);
        if index < self.first_visible {
            self.first_visible = index;
        } else if index >= self.first_visible + height {
            self.first_visible = index + 1 - height;
        }
    }

    /// Scroll by `delta` rows without moving the current row.
    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.len().saturating_sub(self.viewport_height);
        self.first_visible = self.first_visible.saturating_add_signed(delta).min(max);
    }

    /// Row at `y` rows below the top of the pane.
    pub fn row_at_y(&self, y: usize) -> Option<usize> {
        let row = self.first_visible + y;
        (row < self.len()).then_some(row)
    }
}

//! Two-point text cursor over a line store.
//!
//! Positions are (line, char column). The selection is whatever lies between
//! `anchor` and `head`; it is never flattened into one string, views ask for
//! the slice of each visible line instead.

use super::surface::TextMeasure;
use crate::config::RenderConfig;
use crate::model::TextPosition;
use std::time::{Duration, Instant};

/// Selection anchored at one position and extended to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextCursor {
    anchor: TextPosition,
    head: TextPosition,
    config: RenderConfig,
}

impl TextCursor {
    /// Cursor at (0, 0) with no selection.
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Where the selection started.
    pub fn anchor(&self) -> TextPosition {
        self.anchor
    }

    /// Where the selection was extended to.
    pub fn head(&self) -> TextPosition {
        self.head
    }

    /// Earlier of anchor and head.
    pub fn begin(&self) -> TextPosition {
        self.anchor.min(self.head)
    }

    /// Later of anchor and head.
    pub fn end(&self) -> TextPosition {
        self.anchor.max(self.head)
    }

    /// `true` when anchor and head differ.
    pub fn has_selection(&self) -> bool {
        self.anchor != self.head
    }

    /// `true` when the selection spans more than one line.
    pub fn has_multi_line(&self) -> bool {
        self.begin().line != self.end().line
    }

    /// `true` when `line` lies between begin and end (inclusive).
    pub fn within_line(&self, line: usize) -> bool {
        self.begin().line <= line && line <= self.end().line
    }

    /// Collapse the selection onto `pos`.
    pub fn move_to(&mut self, pos: TextPosition) {
        self.anchor = pos;
        self.head = pos;
    }

    /// Move the head, keeping the anchor.
    pub fn select_to(&mut self, pos: TextPosition) {
        self.head = pos;
    }

    /// Collapse the selection onto the anchor.
    pub fn clear(&mut self) {
        self.head = self.anchor;
    }

    /// Select the word under `pos` in `text`, the text of `pos.line`.
    ///
    /// Word characters are ASCII letters, digits and `_`. On anything else
    /// the selection collapses onto `pos`.
    pub fn select_word(&mut self, pos: TextPosition, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        if !chars.get(pos.column).copied().is_some_and(is_word_char) {
            self.move_to(pos);
            return;
        }

        let mut start = pos.column;
        while start > 0 && is_word_char(chars[start - 1]) {
            start -= 1;
        }
        let mut end = pos.column + 1;
        while end < chars.len() && is_word_char(chars[end]) {
            end += 1;
        }

        self.anchor = TextPosition::new(pos.line, start);
        self.head = TextPosition::new(pos.line, end);
    }

    /// Select all of `line`, which is `char_len` columns long.
    pub fn select_line(&mut self, line: usize, char_len: usize) {
        self.anchor = TextPosition::new(line, 0);
        self.head = TextPosition::new(line, char_len);
    }

    /// Select everything; `last_line_len` is the char length of the last line.
    pub fn select_all(&mut self, line_count: usize, last_line_len: usize) {
        if line_count == 0 {
            self.move_to(TextPosition::default());
            return;
        }
        self.anchor = TextPosition::default();
        self.head = TextPosition::new(line_count - 1, last_line_len);
    }

    /// Selected columns `[start, end)` of `line`, clipped to `char_len`.
    ///
    /// `None` when the selection does not touch the line or covers nothing
    /// on it.
    pub fn selection_range_for_line(&self, line: usize, char_len: usize) -> Option<(usize, usize)> {
        if !self.has_selection() || !self.within_line(line) {
            return None;
        }
        let (begin, end) = (self.begin(), self.end());
        let start = if line == begin.line { begin.column } else { 0 };
        let stop = if line == end.line { end.column } else { char_len };
        let (start, stop) = (start.min(char_len), stop.min(char_len));
        (start < stop).then_some((start, stop))
    }

    /// Selected part of the first selected line, given that line's text.
    pub fn selected_text_first_line(&self, first_line_text: &str) -> Option<String> {
        let char_len = first_line_text.chars().count();
        let (start, end) = self.selection_range_for_line(self.begin().line, char_len)?;
        Some(
            first_line_text
                .chars()
                .skip(start)
                .take(end - start)
                .collect(),
        )
    }

    /// Render settings used to map screen offsets to columns.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Replace render settings.
    pub fn update_config(&mut self, config: RenderConfig) {
        self.config = config;
    }

    /// Position under host offset `x` on `line`, whose text is `text`.
    pub fn position_at<M: TextMeasure>(
        &self,
        line: usize,
        text: &str,
        x: usize,
        measure: &M,
    ) -> TextPosition {
        TextPosition::new(line, measure.column_at_x(text, x, &self.config))
    }
}

/// ASCII word character (`[A-Za-z0-9_]`).
pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

// ===== Multi-click detection =====

/// How many presses a click belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    /// Place the cursor.
    Single,
    /// Select a word.
    Double,
    /// Select a line.
    Triple,
}

/// Turns mouse presses into single, double and triple clicks.
///
/// Terminals only report presses, so repeated presses on the same line
/// within `interval` of each other are counted here.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    interval: Duration,
    last: Option<(Instant, usize)>,
    count: u8,
}

impl ClickTracker {
    /// Tracker treating presses closer than `interval` as one gesture.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
            count: 0,
        }
    }

    /// Register a press on `line` at `now`.
    pub fn register(&mut self, line: usize, now: Instant) -> ClickKind {
        let continues = self.last.is_some_and(|(at, last_line)| {
            last_line == line && now.saturating_duration_since(at) <= self.interval
        });

        self.count = if continues && self.count < 3 {
            self.count + 1
        } else {
            1
        };
        self.last = Some((now, line));

        match self.count {
            1 => ClickKind::Single,
            2 => ClickKind::Double,
            _ => ClickKind::Triple,
        }
    }

    /// Forget the previous press.
    pub fn reset(&mut self) {
        self.last = None;
        self.count = 0;
    }
}

//! Append-only line storage with viewport math.
//!
//! Lines are only measured once they have been inside the viewport, so a
//! huge diff costs width measurements proportional to what the user has
//! actually scrolled through.

use super::surface::{ColumnMeasure, TextMeasure};
use crate::config::RenderConfig;
use crate::model::LineKind;
use encoding_rs::Encoding;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

/// A decoded, classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    kind: LineKind,
    text: Arc<str>,
    encoding: Option<&'static Encoding>,
}

impl SourceLine {
    /// Line with text that needed no decoding.
    pub fn new(kind: LineKind, text: impl Into<Arc<str>>) -> Self {
        Self {
            kind,
            text: text.into(),
            encoding: Some(encoding_rs::UTF_8),
        }
    }

    /// Line decoded from raw bytes; `encoding` is `None` when decoding was lossy.
    pub fn decoded(
        kind: LineKind,
        text: impl Into<Arc<str>>,
        encoding: Option<&'static Encoding>,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            encoding,
        }
    }

    /// Classification.
    pub fn kind(&self) -> LineKind {
        self.kind
    }

    /// Decoded text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Shared handle to the text, for background search snapshots.
    pub fn shared_text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    /// Encoding the text was decoded with.
    pub fn encoding(&self) -> Option<&'static Encoding> {
        self.encoding
    }

    /// Length in char columns.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Largest scroll offsets for the current content and viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollExtents {
    /// Largest first-visible line.
    pub vertical: usize,
    /// Largest horizontal offset in host units.
    pub horizontal: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ExtentsKey {
    viewport_width: usize,
    viewport_height: usize,
    line_height: usize,
    first_visible: usize,
}

/// Ordered lines of one view.
#[derive(Debug, Clone)]
pub struct LineStore<M: TextMeasure = ColumnMeasure> {
    lines: Vec<SourceLine>,
    measure: M,
    config: RenderConfig,
    widths: HashMap<usize, usize>,
    max_width: usize,
    first_visible: usize,
    viewport_height: usize,
    line_height: usize,
    extents: Option<(ExtentsKey, ScrollExtents)>,
}

impl Default for LineStore<ColumnMeasure> {
    fn default() -> Self {
        Self::new(ColumnMeasure, RenderConfig::default())
    }
}

impl<M: TextMeasure> LineStore<M> {
    /// Empty store measuring with `measure`.
    pub fn new(measure: M, config: RenderConfig) -> Self {
        Self {
            lines: Vec::new(),
            measure,
            config,
            widths: HashMap::new(),
            max_width: 0,
            first_visible: 0,
            viewport_height: 0,
            line_height: 1,
            extents: None,
        }
    }

    // ===== Content =====

    /// Append `line` at index `len()`; returns that index.
    ///
    /// Measured immediately only when it lands inside the viewport.
    pub fn append(&mut self, line: SourceLine) -> usize {
        let index = self.lines.len();
        self.lines.push(line);
        if self.current_window().contains(&index) {
            self.measure_line(index);
        }
        self.extents = None;
        index
    }

    /// Append every line of `lines`.
    pub fn extend(&mut self, lines: impl IntoIterator<Item = SourceLine>) {
        for line in lines {
            self.append(line);
        }
    }

    /// Drop all lines and cached widths; scrolls back to the top.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.widths.clear();
        self.max_width = 0;
        self.first_visible = 0;
        self.extents = None;
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// `true` without lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line at `index`.
    pub fn line(&self, index: usize) -> Option<&SourceLine> {
        self.lines.get(index)
    }

    /// Text of the line at `index`.
    pub fn text(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(SourceLine::text)
    }

    /// All lines in order.
    pub fn lines(&self) -> &[SourceLine] {
        &self.lines
    }

    /// Cheap copy of every line's text for a background search.
    pub fn text_snapshot(&self) -> Vec<Arc<str>> {
        self.lines.iter().map(SourceLine::shared_text).collect()
    }

    // ===== Configuration =====

    /// Current render settings.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Measurement capability.
    pub fn measure(&self) -> &M {
        &self.measure
    }

    /// Apply new settings; cached widths depend on them and are dropped.
    pub fn update_config(&mut self, config: RenderConfig) {
        if self.config == config {
            return;
        }
        self.config = config;
        self.widths.clear();
        self.max_width = 0;
        self.extents = None;
    }

    // ===== Viewport =====

    /// Record the viewport height and line height (host units).
    pub fn set_viewport(&mut self, viewport_height: usize, line_height: usize) {
        self.viewport_height = viewport_height;
        self.line_height = line_height.max(1);
        self.extents = None;
    }

    /// Whole lines that fit the viewport.
    pub fn lines_per_page(&self) -> usize {
        self.viewport_height / self.line_height
    }

    /// First line drawn at the top of the viewport.
    pub fn first_visible_line(&self) -> usize {
        self.first_visible
    }

    /// Lines touching a viewport of `viewport_height` scrolled to
    /// `first_visible`, plus one for a partially visible trailing row.
    pub fn visible_range(
        &self,
        viewport_height: usize,
        first_visible: usize,
        line_height: usize,
    ) -> Range<usize> {
        let rows = viewport_height.div_ceil(line_height.max(1));
        let start = first_visible.min(self.lines.len());
        let end = self.lines.len().min(first_visible.saturating_add(rows + 1));
        start..end
    }

    /// [`visible_range`](Self::visible_range) for the stored viewport.
    pub fn current_window(&self) -> Range<usize> {
        self.visible_range(self.viewport_height, self.first_visible, self.line_height)
    }

    /// Scroll limits for a viewport of the given size.
    ///
    /// Lines in the visible window that were never measured are measured
    /// now; everything else reuses cached widths.
    pub fn scroll_extents(
        &mut self,
        viewport_width: usize,
        viewport_height: usize,
        line_height: usize,
    ) -> ScrollExtents {
        let key = ExtentsKey {
            viewport_width,
            viewport_height,
            line_height,
            first_visible: self.first_visible,
        };
        if let Some((cached_key, extents)) = self.extents {
            if cached_key == key {
                return extents;
            }
        }

        for index in self.visible_range(viewport_height, self.first_visible, line_height) {
            self.measure_line(index);
        }

        let lines_per_page = viewport_height / line_height.max(1);
        let extents = ScrollExtents {
            vertical: self.lines.len().saturating_sub(lines_per_page),
            horizontal: self.max_width.saturating_sub(viewport_width),
        };
        self.extents = Some((key, extents));
        extents
    }

    /// Largest vertical offset for the stored viewport.
    pub fn max_first_visible(&self) -> usize {
        self.lines.len().saturating_sub(self.lines_per_page())
    }

    /// Scroll so `line` is the first visible one.
    ///
    /// Clamped to the content; returns `false` when nothing moved.
    pub fn goto_line(&mut self, line: usize) -> bool {
        if self.lines.is_empty() {
            return false;
        }
        let target = line
            .min(self.lines.len() - 1)
            .min(self.max_first_visible());
        if target == self.first_visible {
            return false;
        }
        self.first_visible = target;
        true
    }

    /// Scroll by `delta` lines.
    pub fn scroll_by(&mut self, delta: isize) -> bool {
        let target = self.first_visible.saturating_add_signed(delta);
        self.goto_line(target)
    }

    /// Scroll the minimum needed for `line` to be fully visible.
    pub fn ensure_visible(&mut self, line: usize) -> bool {
        let page = self.lines_per_page().max(1);
        if line < self.first_visible {
            self.goto_line(line)
        } else if line >= self.first_visible + page {
            self.goto_line(line + 1 - page)
        } else {
            false
        }
    }

    /// Line drawn at `y` (host units from the top of the viewport).
    pub fn line_at_y(&self, y: usize) -> Option<usize> {
        let index = self.first_visible + y / self.line_height;
        (index < self.lines.len()).then_some(index)
    }

    // ===== Widths =====

    /// Widest measured line so far.
    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// Cached width of `index`, if it has been measured.
    pub fn cached_width(&self, index: usize) -> Option<usize> {
        self.widths.get(&index).copied()
    }

    /// Number of lines measured since the last clear.
    pub fn measured_count(&self) -> usize {
        self.widths.len()
    }

    fn measure_line(&mut self, index: usize) {
        if self.widths.contains_key(&index) {
            return;
        }
        let Some(line) = self.lines.get(index) else {
            return;
        };
        let width = self.measure.measure_width(line.text(), &self.config);
        self.widths.insert(index, width);
        self.max_width = self.max_width.max(width);
    }
}

#[cfg(test)]
#[path = "line_store_tests.rs"]
mod tests;

//! Capabilities the core borrows from whatever paints the text.
//!
//! The line store asks a [`TextMeasure`] how wide a line is; views hand a
//! [`TextRun`] with its [`FormatRange`]s to a [`RenderSurface`]. Neither the
//! store nor the cursor knows whether the host is a terminal or a test.

use crate::config::RenderConfig;
use crate::model::LineKind;
use unicode_width::UnicodeWidthChar;

// ===== Format ranges =====

/// Why a span of a line is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// Part of the cursor selection.
    Selection {
        /// Whether the view owning the selection has focus.
        focused: bool,
    },
    /// A find match.
    FindMatch {
        /// The match navigation currently points at.
        current: bool,
    },
    /// A keyword highlight.
    Highlight,
}

/// Highlighted span of one line, in char columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatRange {
    /// First highlighted column.
    pub start: usize,
    /// Number of highlighted columns.
    pub len: usize,
    /// What the highlight means.
    pub kind: FormatKind,
}

impl FormatRange {
    /// Range covering `[start, end)`.
    pub fn span(start: usize, end: usize, kind: FormatKind) -> Self {
        Self {
            start,
            len: end.saturating_sub(start),
            kind,
        }
    }

    /// One past the last highlighted column.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// `true` when `column` is inside the range.
    pub fn contains(&self, column: usize) -> bool {
        column >= self.start && column < self.end()
    }
}

// ===== Capabilities =====

/// Width measurement in host units.
pub trait TextMeasure {
    /// Width of `text` when drawn with `config`.
    fn measure_width(&self, text: &str, config: &RenderConfig) -> usize;

    /// Char column whose glyph covers `x`, clamped to the end of the text.
    fn column_at_x(&self, text: &str, x: usize, config: &RenderConfig) -> usize {
        let mut consumed = String::new();
        for (column, ch) in text.chars().enumerate() {
            consumed.push(ch);
            if self.measure_width(&consumed, config) > x {
                return column;
            }
        }
        text.chars().count()
    }
}

/// One line ready to paint.
#[derive(Debug, Clone, Copy)]
pub struct TextRun<'a> {
    /// Decoded text.
    pub text: &'a str,
    /// Classification driving the base style.
    pub kind: LineKind,
    /// Spans drawn on top of the base style.
    pub formats: &'a [FormatRange],
    /// Left edge of the line on the surface.
    pub x: u16,
    /// Row of the line on the surface.
    pub y: u16,
    /// Space available to the right of `x`.
    pub width: u16,
    /// Display columns scrolled off to the left.
    pub skip_columns: usize,
}

/// Something that can paint formatted runs.
pub trait RenderSurface: TextMeasure {
    /// Paint `run` with its format ranges.
    fn draw_formatted_run(&mut self, run: &TextRun<'_>, config: &RenderConfig);
}

// ===== Column measurement =====

/// Terminal-cell measurement: Unicode display width with tab stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMeasure;

impl TextMeasure for ColumnMeasure {
    fn measure_width(&self, text: &str, config: &RenderConfig) -> usize {
        text.chars()
            .fold(0, |width, ch| width + char_width(ch, width, config.tab_width))
    }

    fn column_at_x(&self, text: &str, x: usize, config: &RenderConfig) -> usize {
        let mut width = 0;
        for (column, ch) in text.chars().enumerate() {
            width += char_width(ch, width, config.tab_width);
            if width > x {
                return column;
            }
        }
        text.chars().count()
    }
}

/// Cells taken by `ch` when it starts at display column `at`.
///
/// Control characters other than tab take one cell; surfaces draw a marker
/// for them.
pub fn char_width(ch: char, at: usize, tab_width: usize) -> usize {
    match ch {
        '\t' => {
            let tab = tab_width.max(1);
            tab - at % tab
        }
        c if c.is_control() => 1,
        c => c.width().unwrap_or(0),
    }
}

//! View-state layer: line storage, viewport math and selection.
//!
//! # Module Structure
//!
//! - `line_store`: LineStore - append-only lines with deferred width measurement
//! - `cursor`: TextCursor and ClickTracker - selection model and multi-click detection
//! - `surface`: TextMeasure / RenderSurface - capabilities borrowed from the host

pub mod cursor;
pub mod line_store;
pub mod surface;

pub use cursor::{is_word_char, ClickKind, ClickTracker, TextCursor};
pub use line_store::{LineStore, ScrollExtents, SourceLine};
pub use surface::{
    char_width, ColumnMeasure, FormatKind, FormatRange, RenderSurface, TextMeasure, TextRun,
};

//! Addressable (line, column) positions.

/// A position in the line store.
///
/// Columns count characters of the decoded line text. Ordering is lexical by
/// `(line, column)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TextPosition {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based character column.
    pub column: usize,
}

impl TextPosition {
    /// Create a position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl From<(usize, usize)> for TextPosition {
    fn from((line, column): (usize, usize)) -> Self {
        Self { line, column }
    }
}

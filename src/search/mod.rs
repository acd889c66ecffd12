//! Text search over line stores.
//!
//! - [`FindFlags`] + query → compiled [`Regex`] (literal queries are escaped)
//! - [`search_lines`]: matches of one line range, as char columns
//! - [`results`]: ordered result set with page-relative merging and navigation
//! - [`engine`]: debounced, cancellable background search

pub mod engine;
pub mod results;

pub use engine::{FindEngine, FindUpdate};
pub use results::{FindPart, FindResultSet, FindStatus};

use regex::{Regex, RegexBuilder};
use std::ops::Range;
use thiserror::Error;

/// Search options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FindFlags {
    /// Match case exactly.
    pub case_sensitive: bool,
    /// Only match whole words.
    pub whole_word: bool,
    /// Treat the query as a regular expression.
    pub use_regex: bool,
}

/// Search failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FindError {
    /// The query is not a valid regular expression.
    #[error("Invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// Query as typed.
        pattern: String,
        /// Compiler message.
        reason: String,
    },
}

/// One match: `[start, end)` char columns of `line`.
///
/// Ordered by `(line, start)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FindMatch {
    /// Line index.
    pub line: usize,
    /// First matched column.
    pub start: usize,
    /// One past the last matched column.
    pub end: usize,
}

impl FindMatch {
    /// Match on `line` covering `[start, end)`.
    pub fn new(line: usize, start: usize, end: usize) -> Self {
        Self { line, start, end }
    }
}

/// Compile `query` with `flags`.
pub fn compile(query: &str, flags: FindFlags) -> Result<Regex, FindError> {
    let mut pattern = if flags.use_regex {
        query.to_string()
    } else {
        regex::escape(query)
    };
    if flags.whole_word {
        pattern = format!(r"\b(?:{pattern})\b");
    }

    RegexBuilder::new(&pattern)
        .case_insensitive(!flags.case_sensitive)
        .build()
        .map_err(|e| FindError::InvalidPattern {
            pattern: query.to_string(),
            reason: e.to_string(),
        })
}

/// Matches of `regex` in `lines[range]`, in order.
///
/// Empty matches are skipped. `should_stop` is polled before every line;
/// once it returns `true` the scan ends and `None` is returned.
pub fn search_lines<S, F>(
    lines: &[S],
    range: Range<usize>,
    regex: &Regex,
    mut should_stop: F,
) -> Option<Vec<FindMatch>>
where
    S: AsRef<str>,
    F: FnMut() -> bool,
{
    let end = range.end.min(lines.len());
    let start = range.start.min(end);
    let mut matches = Vec::new();

    for (line, text) in lines[start..end].iter().enumerate() {
        if should_stop() {
            return None;
        }
        matches_in_line(start + line, text.as_ref(), regex, &mut matches);
    }
    Some(matches)
}

fn matches_in_line(line: usize, text: &str, regex: &Regex, out: &mut Vec<FindMatch>) {
    // byte offsets advance monotonically, so count chars incrementally
    let mut byte_pos = 0;
    let mut char_pos = 0;
    for m in regex.find_iter(text) {
        if m.is_empty() {
            continue;
        }
        char_pos += text[byte_pos..m.start()].chars().count();
        let start = char_pos;
        char_pos += m.as_str().chars().count();
        byte_pos = m.end();
        out.push(FindMatch::new(line, start, char_pos));
    }
}

//! Streaming diff parser.
//!
//! Classifies unified and combined diff output into [`LineRecord`]s. The
//! parser is fed whole lines (see [`LineChunker`](super::LineChunker)) in as
//! many chunks as the command runner produces and keeps just enough state to
//! classify the next line.

use crate::model::{FileRowIndex, LineKind, LineRecord};
use regex::bytes::Regex;
use std::sync::LazyLock;

static FILE_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)^diff --(?:git a/(.*) b/(.*)|cc (.*))").expect("valid file header regex")
});

// Two or more `@` on each side and any number of `±N[,N]` groups, so combined
// diffs with more than two parents match too.
static HUNK_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)^@{2,}(?: [+\-][0-9]+(?:,[0-9]+)?)+ @{2,}").expect("valid hunk regex")
});

static SUBMODULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)^Submodule (.*) [a-z0-9]{7,}\.{2,3}[a-z0-9]{7,}.*$")
        .expect("valid submodule regex")
});

/// Default line separator of diff output.
pub const DIFF_SEPARATOR: u8 = b'\n';

/// `true` when `line` starts a hunk (`@@ -1,2 +1,3 @@`, `@@@ ... @@@`).
pub fn is_hunk_start(line: &[u8]) -> bool {
    HUNK_START_RE.is_match(line)
}

// ===== ParsedBatch =====

/// Output of one parse call: numbered records and the files they introduced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBatch {
    /// Records with the row each one occupies in the line store.
    pub lines: Vec<(usize, LineRecord)>,
    /// Files whose header appeared in this batch.
    pub files: FileRowIndex,
}

impl ParsedBatch {
    /// `true` when nothing was produced.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.files.is_empty()
    }

    /// Append another batch after this one.
    pub fn merge(&mut self, other: ParsedBatch) {
        self.lines.extend(other.lines);
        self.files.extend(other.files);
    }

    /// Records without row numbers.
    pub fn records(&self) -> impl Iterator<Item = &LineRecord> {
        self.lines.iter().map(|(_, record)| record)
    }
}

// ===== DiffStreamParser =====

/// Where the parser is within the current patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// No file header seen since the last reset.
    AwaitingHeader,
    /// Between a file header and its first hunk.
    InFileInfo,
    /// Inside hunk content; everything until the next header is diff.
    InHunk,
}

/// Incremental diff classifier.
#[derive(Debug, Clone)]
pub struct DiffStreamParser {
    state: ParserState,
    row: usize,
    first_patch: bool,
    separator: u8,
}

impl Default for DiffStreamParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffStreamParser {
    /// Parser assigning rows from 0.
    pub fn new() -> Self {
        Self::with_start_row(0)
    }

    /// Parser assigning rows from `row`.
    pub fn with_start_row(row: usize) -> Self {
        Self {
            state: ParserState::AwaitingHeader,
            row,
            first_patch: true,
            separator: DIFF_SEPARATOR,
        }
    }

    /// Use a different line separator.
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Row the next record will get.
    pub fn row(&self) -> usize {
        self.row
    }

    /// `true` while inside hunk content.
    pub fn in_hunk(&self) -> bool {
        self.state == ParserState::InHunk
    }

    /// Re-base rows and start over as if no patch had been seen.
    ///
    /// Used when patch output is appended after lines that are already in the
    /// line store (commit header, comments).
    pub fn reset_row(&mut self, row: usize) {
        self.row = row;
        self.state = ParserState::AwaitingHeader;
        self.first_patch = true;
    }

    /// Parse a chunk of whole lines.
    ///
    /// One trailing separator is trimmed before splitting; the chunk must not
    /// end in the middle of a line.
    pub fn parse_chunk(&mut self, data: &[u8]) -> ParsedBatch {
        let mut batch = ParsedBatch::default();
        if data.is_empty() {
            return batch;
        }

        let data = match data.last() {
            Some(&last) if last == self.separator => &data[..data.len() - 1],
            _ => data,
        };
        let separator = self.separator;
        for line in data.split(|&b| b == separator) {
            self.parse_line(line, &mut batch);
        }
        batch
    }

    /// Classify one line (without its separator).
    pub fn parse_line(&mut self, line: &[u8], batch: &mut ParsedBatch) {
        let header = strip_cr(line);
        if let Some(caps) = FILE_HEADER_RE.captures(header) {
            self.begin_patch(batch);

            let (file_a, file_b) = match caps.get(3) {
                Some(cc) => (cc.as_bytes(), None),
                None => (
                    caps.get(1).map_or(&b""[..], |m| m.as_bytes()),
                    caps.get(2).map(|m| m.as_bytes()),
                ),
            };
            // renames: only the new name is navigable
            let shown = match file_b {
                Some(b) if b != file_a => b,
                _ => file_a,
            };
            batch
                .files
                .insert(String::from_utf8_lossy(shown).into_owned(), self.row);
            self.emit(batch, LineKind::File, shown);

            self.state = ParserState::InFileInfo;
                return;
        }

        if let Some(caps) = SUBMODULE_RE.captures(header) {
            self.begin_patch(batch);

            let submodule = caps.get(1).map_or(&b""[..], |m| m.as_bytes());
            batch
                .files
                .insert(String::from_utf8_lossy(submodule).into_owned(), self.row);
            self.emit(batch, LineKind::File, submodule);
            self.emit(batch, LineKind::FileInfo, header);

            self.state = ParserState::InHunk;
            return;
        }

        let kind = if self.state == ParserState::InHunk {
            LineKind::Diff
        } else if is_hunk_start(line) {
            self.state = ParserState::InHunk;
            LineKind::Diff
        } else if line.starts_with(b"--- ") || line.starts_with(b"+++ ") {
            return;
        } else if line.is_empty() {
            return;
        } else {
            LineKind::FileInfo
        };

        if kind.is_diff_content() {
            self.emit(batch, kind, line);
        } else {
            self.emit(batch, kind, header);
        }
    }

    /// Blank separator between patches, except before the first one.
    fn begin_patch(&mut self, batch: &mut ParsedBatch) {
        if !self.first_patch {
            self.emit(batch, LineKind::Diff, b"");
        }
        self.first_patch = false;
    }

    fn emit(&mut self, batch: &mut ParsedBatch, kind: LineKind, bytes: &[u8]) {
        batch.lines.push((self.row, LineRecord::new(kind, bytes)));
        self.row += 1;
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && line[end - 1] == b'\r' {
        end -= 1;
    }
    &line[..end]
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;

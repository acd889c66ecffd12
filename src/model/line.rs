//! Classified line records.

/// Classification of a renderable line.
///
/// The diff parser only produces `File`, `FileInfo` and `Diff`.
/// The remaining variants are header lines the diff view adds in front of the
/// patch when it shows a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// File header (`diff --git` / `diff --cc` / submodule path).
    File,
    /// Mode changes, rename notices, index lines, submodule summaries.
    FileInfo,
    /// Hunk markers and hunk content, submodule log lines (`  > subject`),
    /// plus the blank separator between patches.
    Diff,
    /// `Author:` / `Committer:` header.
    Author,
    /// `Parent:` / `Child:` header referencing another commit.
    Sha1 {
        /// `true` for parents, `false` for children.
        is_parent: bool,
    },
    /// Plain text (commit comments, spacing).
    Text,
}

impl LineKind {
    /// Lines whose text comes straight out of a patch body.
    ///
    /// Only these keep carriage returns and are decoded with the encoding
    /// carried over from the previous diff line.
    pub fn is_diff_content(self) -> bool {
        self == LineKind::Diff
    }

    /// File and file-info lines, drawn bold on the info background.
    pub fn is_info(self) -> bool {
        matches!(self, LineKind::File | LineKind::FileInfo)
    }

    /// Lines that mark the commit header region (file row 0).
    pub fn is_commit_header(self) -> bool {
        matches!(
            self,
            LineKind::Author | LineKind::Sha1 { is_parent: true }
        )
    }
}

/// One classified line of version-control output.
///
/// Immutable once produced. Holds the raw bytes; decoding happens when the
/// record is appended to the line store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    kind: LineKind,
    raw: Vec<u8>,
}

impl LineRecord {
    /// Create a record.
    pub fn new(kind: LineKind, raw: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }

    /// Line classification.
    pub fn kind(&self) -> LineKind {
        self.kind
    }

    /// Raw bytes as read from the command output.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Consume the record, returning its bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.raw
    }
}

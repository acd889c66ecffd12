//! Parsers for raw version-control output.
//!
//! - [`diff`]: incremental diff classification into line records
//! - [`LineChunker`]: re-aligns fixed-size reads on line separators
//! - [`split_records`]: splits complete log output into raw commit records

pub mod diff;

pub use diff::{is_hunk_start, DiffStreamParser, ParsedBatch, DIFF_SEPARATOR};

// ===== LineChunker =====

/// Buffers the partial trailing line of each read.
///
/// Reads from a pipe end wherever the buffer fills up, usually in the middle
/// of a line. `push` hands back only the prefix that ends with a separator and
/// keeps the rest for the next call, so every chunk the parser sees is made of
/// whole lines.
#[derive(Debug, Clone)]
pub struct LineChunker {
    separator: u8,
    pending: Vec<u8>,
}

impl LineChunker {
    /// Chunker splitting on `separator`.
    pub fn new(separator: u8) -> Self {
        Self {
            separator,
            pending: Vec::new(),
        }
    }

    /// Feed a read; returns the complete lines accumulated so far, if any.
    pub fn push(&mut self, data: &[u8]) -> Option<Vec<u8>> {
        let Some(last_sep) = data.iter().rposition(|&b| b == self.separator) else {
            self.pending.extend_from_slice(data);
            return None;
        };

        let mut complete = std::mem::take(&mut self.pending);
        complete.extend_from_slice(&data[..=last_sep]);
        self.pending.extend_from_slice(&data[last_sep + 1..]);
        Some(complete)
    }

    /// End of stream: whatever is left, if anything.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

/// Split complete log output into raw records on `separator`.
///
/// Empty records (from a trailing separator or `\n` padding) are skipped.
pub fn split_records(data: &[u8], separator: u8) -> Vec<Vec<u8>> {
    data.split(|&b| b == separator)
        .map(trim_record)
        .filter(|r| !r.is_empty())
        .map(<[u8]>::to_vec)
        .collect()
}

// `git log -z` separates records with NUL but may leave the newline that
// ended the previous record's message at the start of the next one.
fn trim_record(record: &[u8]) -> &[u8] {
    let start = record.iter().position(|&b| b != b'\n').unwrap_or(record.len());
    &record[start..]
}

//! Commit metadata parsed from delimited log records.

use tracing::debug;

/// Field delimiter inside one raw log record.
pub const FIELD_DELIMITER: u8 = 0x01;

/// Number of fields a well-formed record carries.
pub const FIELD_COUNT: usize = 7;

/// Commit metadata.
///
/// Field order in the raw record is
/// `{sha1, comments, author, authorDate, committer, committerDate, parents}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    /// Full object name.
    pub sha1: String,
    /// Author name and address.
    pub author: String,
    /// Author date as printed by the tool.
    pub author_date: String,
    /// Committer name and address.
    pub committer: String,
    /// Committer date as printed by the tool.
    pub committer_date: String,
    /// Parent object names, in order.
    pub parents: Vec<String>,
    /// Child object names. Not part of the raw record; filled by the log view.
    pub children: Vec<String>,
    /// Full commit message, without surrounding newlines.
    pub comments: String,
}

impl Commit {
    /// Parse a raw record.
    ///
    /// Never fails: a record without exactly seven fields yields
    /// `Commit::default()`.
    pub fn from_raw(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        let parts: Vec<&str> = text.split(FIELD_DELIMITER as char).collect();
        if parts.len() != FIELD_COUNT {
            debug!(
                fields = parts.len(),
                "Malformed commit record, using empty commit"
            );
            return Self::default();
        }

        Self {
            sha1: parts[0].to_string(),
            comments: parts[1].trim_matches('\n').to_string(),
            author: parts[2].to_string(),
            author_date: parts[3].to_string(),
            committer: parts[4].to_string(),
            committer_date: parts[5].to_string(),
            parents: parts[6]
                .split(' ')
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            children: Vec::new(),
        }
    }

    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.comments.lines().next().unwrap_or("")
    }
}

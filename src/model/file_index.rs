//! File path to line-store row mapping.

use std::collections::HashMap;

/// Maps each file path to the row where its block begins.
///
/// Keys are unique and iterate in first-seen order. Re-inserting an existing
/// path keeps the first row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRowIndex {
    order: Vec<String>,
    rows: HashMap<String, usize>,
}

impl FileRowIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` at `row` unless it is already present.
    ///
    /// Returns `true` when the path was new.
    pub fn insert(&mut self, path: impl Into<String>, row: usize) -> bool {
        let path = path.into();
        if self.rows.contains_key(&path) {
            return false;
        }
        self.rows.insert(path.clone(), row);
        self.order.push(path);
        true
    }

    /// Merge another index, keeping first occurrences.
    pub fn extend(&mut self, other: FileRowIndex) {
        for (path, row) in other.into_entries() {
            self.insert(path, row);
        }
    }

    /// Row for a path.
    pub fn row(&self, path: &str) -> Option<usize> {
        self.rows.get(path).copied()
    }

    /// Path whose block starts exactly at `row`.
    pub fn path_at_row(&self, row: usize) -> Option<&str> {
        self.order
            .iter()
            .find(|p| self.rows.get(p.as_str()) == Some(&row))
            .map(String::as_str)
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.order
            .iter()
            .map(move |p| (p.as_str(), self.rows[p.as_str()]))
    }

    /// Consume into `(path, row)` pairs in first-seen order.
    pub fn into_entries(self) -> Vec<(String, usize)> {
        let FileRowIndex { order, mut rows } = self;
        order
            .into_iter()
            .filter_map(|p| rows.remove(&p).map(|r| (p, r)))
            .collect()
    }

    /// Number of paths.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// `true` when no path has been recorded.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.order.clear();
        self.rows.clear();
    }
}

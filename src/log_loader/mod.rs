//! Lazy commit materialization over a large ordered log.
//!
//! The log is fetched as one raw byte record per commit. Parsing every record
//! up front would double the memory of big histories for rows nobody looks
//! at, so slots are filled on first access and the raw records are dropped
//! once the last slot is filled.

use crate::model::Commit;
use tracing::debug;

/// Outcome of an interruptible sha1 prefix scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixSearch {
    /// First index whose sha1 starts with the prefix.
    Found(usize),
    /// Every commit was visited without a match.
    NotFound,
    /// The caller stopped the scan before visiting this index.
    Interrupted(usize),
}

/// Ordered commit slots backed by raw records.
#[derive(Debug, Default)]
pub struct LazyLogLoader {
    source: Option<Vec<Vec<u8>>>,
    commits: Vec<Option<Commit>>,
    materialized: usize,
}

impl LazyLogLoader {
    /// Empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all state with `records`; every slot starts empty.
    pub fn set_source(&mut self, records: Vec<Vec<u8>>) {
        self.commits = vec![None; records.len()];
        self.materialized = 0;
        self.source = if records.is_empty() {
            None
        } else {
            Some(records)
        };
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.set_source(Vec::new());
    }

    /// Number of commits.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// `true` when there are no commits.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Number of slots parsed so far.
    pub fn materialized_count(&self) -> usize {
        self.materialized
    }

    /// `true` once the raw records have been released.
    pub fn is_source_released(&self) -> bool {
        self.source.is_none()
    }

    /// Commit at `index`, parsing it on first access.
    pub fn get(&mut self, index: usize) -> Option<&Commit> {
        if index >= self.commits.len() {
            return None;
        }
        self.ensure(index);
        self.commits[index].as_ref()
    }

    /// Commit at `index` if it has already been parsed.
    pub fn peek(&self, index: usize) -> Option<&Commit> {
        self.commits.get(index).and_then(Option::as_ref)
    }

    /// First index whose sha1 starts with `prefix`.
    ///
    /// Scans from 0 and materializes every commit it visits.
    pub fn find_by_sha1_prefix(&mut self, prefix: &str) -> Option<usize> {
        match self.find_by_sha1_prefix_with(prefix, |_| false) {
            PrefixSearch::Found(index) => Some(index),
            PrefixSearch::NotFound | PrefixSearch::Interrupted(_) => None,
        }
    }

    /// Prefix scan that asks `should_stop(index)` before visiting each index.
    pub fn find_by_sha1_prefix_with<F>(&mut self, prefix: &str, mut should_stop: F) -> PrefixSearch
    where
        F: FnMut(usize) -> bool,
    {
        for index in 0..self.commits.len() {
            if should_stop(index) {
                return PrefixSearch::Interrupted(index);
            }
            self.ensure(index);
            if self.commits[index]
                .as_ref()
                .is_some_and(|c| c.sha1.starts_with(prefix))
            {
                return PrefixSearch::Found(index);
            }
        }
        PrefixSearch::NotFound
    }

    /// Sha1s of the commits listing the commit at `index` as a parent.
    ///
    /// The log is newest first, so only rows above `index` are visited.
    pub fn children_of(&mut self, index: usize) -> Vec<String> {
        let Some(sha1) = self.get(index).map(|c| c.sha1.clone()) else {
            return Vec::new();
        };
        if sha1.is_empty() {
            return Vec::new();
        }

        let mut children = Vec::new();
        for row in 0..index {
            self.ensure(row);
            if let Some(commit) = &self.commits[row] {
                if commit.parents.iter().any(|p| *p == sha1) {
                    children.push(commit.sha1.clone());
                }
            }
        }
        children
    }

    fn ensure(&mut self, index: usize) {
        if self.commits[index].is_some() {
            return;
        }
        let Some(source) = &self.source else {
            return;
        };

        self.commits[index] = Some(Commit::from_raw(&source[index]));
        self.materialized += 1;

        if self.materialized == self.commits.len() {
            debug!(count = self.materialized, "All commits materialized, releasing raw log");
            self.source = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(sha1: &str, parents: &str) -> Vec<u8> {
        format!("{sha1}\x01subject {sha1}\x01a\x01d\x01c\x01d\x01{parents}").into_bytes()
    }

    fn loader_with(records: Vec<Vec<u8>>) -> LazyLogLoader {
        let mut loader = LazyLogLoader::new();
        loader.set_source(records);
        loader
    }

    #[test]
    fn set_source_creates_empty_slots() {
        let loader = loader_with(vec![raw("aaa", ""), raw("bbb", "aaa")]);

        assert_eq!(loader.len(), 2);
        assert_eq!(loader.materialized_count(), 0);
        assert!(loader.peek(0).is_none());
        assert!(!loader.is_source_released());
    }

    #[test]
    fn get_parses_once_and_caches() {
        let mut loader = loader_with(vec![raw("aaa", ""), raw("bbb", "aaa")]);

        let first = loader.get(1).cloned();
        let second = loader.get(1).cloned();

        assert_eq!(first, second);
        assert_eq!(first.map(|c| c.sha1), Some("bbb".to_string()));
        assert_eq!(loader.materialized_count(), 1);
    }

    #[test]
    fn out_of_range_get_is_none() {
        let mut loader = loader_with(vec![raw("aaa", "")]);

        assert!(loader.get(1).is_none());
        assert_eq!(loader.materialized_count(), 0);
    }

    #[test]
    fn source_released_after_last_slot_filled() {
        let mut loader = loader_with(vec![raw("aaa", ""), raw("bbb", "")]);

        loader.get(0);
        assert!(!loader.is_source_released());
        loader.get(1);
        assert!(loader.is_source_released());

        // cached commits survive the release
        assert_eq!(loader.get(0).map(|c| c.sha1.as_str()), Some("aaa"));
    }

    #[test]
    fn malformed_record_materializes_default_commit() {
        let mut loader = loader_with(vec![b"a\x01b\x01c\x01d\x01e".to_vec()]);

        assert_eq!(loader.get(0), Some(&Commit::default()));
    }

    #[test]
    fn find_by_prefix_scans_sequentially() {
        let mut loader = loader_with(vec![raw("aaa111", ""), raw("bbb222", ""), raw("ccc333", "")]);

        assert_eq!(loader.find_by_sha1_prefix("bbb"), Some(1));
        assert_eq!(loader.materialized_count(), 2, "stops at first match");
        assert_eq!(loader.find_by_sha1_prefix("zzz"), None);
        assert!(loader.is_source_released());
    }

    #[test]
    fn prefix_scan_can_be_interrupted() {
        let mut loader = loader_with(vec![raw("aaa", ""), raw("bbb", ""), raw("ccc", "")]);

        let result = loader.find_by_sha1_prefix_with("ccc", |index| index == 1);

        assert_eq!(result, PrefixSearch::Interrupted(1));
        assert_eq!(loader.materialized_count(), 1);
    }

    #[test]
    fn children_are_found_above_the_commit() {
        let mut loader = loader_with(vec![
            raw("merge", "left right"),
            raw("left", "base"),
            raw("right", "base"),
            raw("base", ""),
        ]);

        assert_eq!(loader.children_of(3), vec!["left", "right"]);
        assert_eq!(loader.children_of(1), vec!["merge"]);
        assert!(loader.children_of(0).is_empty());
    }

    #[test]
    fn set_source_replaces_previous_state() {
        let mut loader = loader_with(vec![raw("aaa", "")]);
        loader.get(0);

        loader.set_source(vec![raw("xxx", ""), raw("yyy", "")]);

        assert_eq!(loader.len(), 2);
        assert_eq!(loader.materialized_count(), 0);
        assert_eq!(loader.get(0).map(|c| c.sha1.as_str()), Some("xxx"));
    }

    #[test]
    fn clear_empties_loader() {
        let mut loader = loader_with(vec![raw("aaa", "")]);
        loader.clear();

        assert!(loader.is_empty());
        assert!(loader.get(0).is_none());
    }
}

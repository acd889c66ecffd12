//! Ordered find results and navigation.

use super::FindMatch;

/// Which region of the document a batch of matches came from.
///
/// A search covers the visible page first so results appear immediately,
/// then the lines above it, then the lines below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindPart {
    /// Whole document; replaces the set.
    All,
    /// The visible page; replaces the set.
    CurrentPage,
    /// Lines above the page; inserted in sorted position.
    BeforeCurPage,
    /// Lines below the page; appended.
    AfterCurPage,
}

/// What the find bar reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindStatus {
    /// No query yet.
    Idle,
    /// A search is running and has found nothing so far.
    Searching,
    /// `count` matches, navigation at `current`.
    Results {
        /// Number of matches.
        count: usize,
        /// Zero-based current match.
        current: usize,
    },
    /// The search finished without matches.
    NoResults,
}

/// Matches sorted by `(line, start)` plus a current index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindResultSet {
    matches: Vec<FindMatch>,
    current: usize,
}

impl FindResultSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch according to `part`.
    ///
    /// - `All` / `CurrentPage`: replace; `current` is taken when given.
    /// - `BeforeCurPage`: insert at the sorted position; without an explicit
    ///   `current` the current index shifts by the number inserted.
    /// - `AfterCurPage`: append; an explicit `current` is relative to the
    ///   batch, so it is offset by the existing length.
    pub fn merge(&mut self, part: FindPart, batch: Vec<FindMatch>, current: Option<usize>) {
        match part {
            FindPart::All | FindPart::CurrentPage => {
                self.matches = batch;
                if let Some(current) = current {
                    self.current = current;
                }
            }
            FindPart::BeforeCurPage => {
                self.current = current.unwrap_or(self.current + batch.len());
                if let Some(first) = batch.first() {
                    let at = self.matches.partition_point(|m| m < first);
                    self.matches.splice(at..at, batch);
                }
            }
            FindPart::AfterCurPage => {
                if let Some(current) = current {
                    self.current = current + self.matches.len();
                }
                self.matches.extend(batch);
            }
        }
    }

    /// Drop every match.
    pub fn clear(&mut self) {
        self.matches.clear();
        self.current = 0;
    }

    /// Number of matches.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// `true` without matches.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// All matches in order.
    pub fn matches(&self) -> &[FindMatch] {
        &self.matches
    }

    /// Index of the current match.
    pub fn current_index(&self) -> Option<usize> {
        (!self.matches.is_empty()).then(|| self.current.min(self.matches.len() - 1))
    }

    /// The current match.
    pub fn current(&self) -> Option<FindMatch> {
        self.current_index().map(|i| self.matches[i])
    }

    /// Point navigation at `index` (clamped).
    pub fn set_current(&mut self, index: usize) {
        self.current = index;
    }

    /// Make `target` current if it is in the set.
    pub fn select_match(&mut self, target: FindMatch) -> bool {
        match self.matches.binary_search(&target) {
            Ok(index) => {
                self.current = index;
                true
            }
            Err(_) => false,
        }
    }

    /// Advance with wraparound; no-op when empty.
    pub fn next(&mut self) -> Option<FindMatch> {
        let index = self.current_index()?;
        self.current = if index + 1 >= self.matches.len() {
            0
        } else {
            index + 1
        };
        self.current()
    }

    /// Step back with wraparound; no-op when empty.
    pub fn previous(&mut self) -> Option<FindMatch> {
        let index = self.current_index()?;
        self.current = if index == 0 {
            self.matches.len() - 1
        } else {
            index - 1
        };
        self.current()
    }

    /// Matches on `line`, in order.
    pub fn matches_on_line(&self, line: usize) -> &[FindMatch] {
        let start = self.matches.partition_point(|m| m.line < line);
        let end = self.matches.partition_point(|m| m.line <= line);
        &self.matches[start..end]
    }

    /// Status for a search that is or is not still running.
    pub fn status(&self, searching: bool) -> FindStatus {
        match self.current_index() {
            Some(current) => FindStatus::Results {
                count: self.matches.len(),
                current,
            },
            None if searching => FindStatus::Searching,
            None => FindStatus::NoResults,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(line: usize, start: usize) -> FindMatch {
        FindMatch::new(line, start, start + 1)
    }

    #[test]
    fn next_wraps_to_first() {
        let mut set = FindResultSet::new();
        set.merge(FindPart::All, vec![m(0, 0), m(1, 0), m(2, 0)], Some(2));

        assert_eq!(set.next(), Some(m(0, 0)));
        assert_eq!(set.current_index(), Some(0));
    }

    #[test]
    fn previous_wraps_to_last() {
        let mut set = FindResultSet::new();
        set.merge(FindPart::All, vec![m(0, 0), m(1, 0), m(2, 0)], Some(0));

        assert_eq!(set.previous(), Some(m(2, 0)));
        assert_eq!(set.current_index(), Some(2));
    }

    #[test]
    fn navigation_on_empty_set_is_noop() {
        let mut set = FindResultSet::new();

        assert_eq!(set.next(), None);
        assert_eq!(set.previous(), None);
        assert_eq!(set.current_index(), None);
    }

    #[test]
    fn before_page_merge_inserts_sorted_and_shifts_current() {
        let mut set = FindResultSet::new();
        set.merge(FindPart::CurrentPage, vec![m(50, 0), m(51, 0)], Some(1));

        set.merge(FindPart::BeforeCurPage, vec![m(3, 0), m(7, 2)], None);

        assert_eq!(set.matches(), &[m(3, 0), m(7, 2), m(50, 0), m(51, 0)]);
        assert_eq!(set.current(), Some(m(51, 0)), "still the same match");
    }

    #[test]
    fn before_page_merge_with_explicit_current() {
        let mut set = FindResultSet::new();
        set.merge(FindPart::CurrentPage, vec![m(50, 0)], Some(0));

        set.merge(FindPart::BeforeCurPage, vec![m(3, 0)], Some(0));

        assert_eq!(set.current(), Some(m(3, 0)));
    }

    #[test]
    fn after_page_merge_appends_and_keeps_current() {
        let mut set = FindResultSet::new();
        set.merge(FindPart::CurrentPage, vec![m(10, 0), m(11, 0)], Some(1));

        set.merge(FindPart::AfterCurPage, vec![m(90, 0)], None);

        assert_eq!(set.len(), 3);
        assert_eq!(set.current_index(), Some(1));
    }

    #[test]
    fn after_page_merge_offsets_explicit_current() {
        let mut set = FindResultSet::new();
        set.merge(FindPart::CurrentPage, vec![m(10, 0), m(11, 0)], Some(0));

        set.merge(FindPart::AfterCurPage, vec![m(90, 0), m(91, 0)], Some(1));

        assert_eq!(set.current(), Some(m(91, 0)));
    }

    #[test]
    fn empty_page_then_before_points_at_first_after_match() {
        let mut set = FindResultSet::new();
        set.merge(FindPart::CurrentPage, Vec::new(), Some(0));
        set.merge(FindPart::BeforeCurPage, vec![m(1, 0)], None);
        set.merge(FindPart::AfterCurPage, vec![m(99, 0)], None);

        assert_eq!(set.current(), Some(m(99, 0)));
    }

    #[test]
    fn select_match_finds_exact_match() {
        let mut set = FindResultSet::new();
        set.merge(FindPart::All, vec![m(1, 0), m(2, 4), m(3, 0)], Some(0));

        assert!(set.select_match(m(2, 4)));
        assert_eq!(set.current_index(), Some(1));
        assert!(!set.select_match(m(2, 5)));
    }

    #[test]
    fn matches_on_line_slices_by_line() {
        let mut set = FindResultSet::new();
        set.merge(FindPart::All, vec![m(1, 0), m(2, 0), m(2, 5), m(4, 0)], None);

        assert_eq!(set.matches_on_line(2), &[m(2, 0), m(2, 5)]);
        assert!(set.matches_on_line(3).is_empty());
    }

    #[test]
    fn status_reflects_progress() {
        let mut set = FindResultSet::new();
        assert_eq!(set.status(true), FindStatus::Searching);
        assert_eq!(set.status(false), FindStatus::NoResults);

        set.merge(FindPart::All, vec![m(1, 0)], Some(0));
        assert_eq!(set.status(false), FindStatus::Results { count: 1, current: 0 });
    }
}

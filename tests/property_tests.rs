//! Property-based tests for parser, cursor and find-result invariants.
//!
//! Tests validate:
//! 1. Parsing is independent of where reads split the stream
//! 2. Cursor begin/end are always ordered
//! 3. Match navigation wraps around
//! 4. Page merges keep matches sorted

use difflens::config::RenderConfig;
use difflens::model::TextPosition;
use difflens::parser::{split_records, DiffStreamParser, LineChunker, ParsedBatch, DIFF_SEPARATOR};
use difflens::search::{FindMatch, FindPart, FindResultSet};
use difflens::view_state::TextCursor;
use proptest::prelude::*;

const PATCH: &[u8] = b"\
diff --git a/src/main.rs b/src/main.rs
index 83db48f..bf269f4 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,4 +1,4 @@
 fn main() {
-    println!(\"old\");
+    println!(\"new\");
 }
diff --git a/old.txt b/new.txt
similarity index 90%
rename from old.txt
rename to new.txt
@@ -3 +3 @@
-a\r
+b\r
diff --git a/docs/guide.md b/docs/guide.md
new file mode 100644
index 0000000..1111111
--- /dev/null
+++ b/docs/guide.md
@@ -0,0 +1,2 @@
+# Guide
+diff --git lookalike inside a hunk
";

fn parse_whole(data: &[u8]) -> ParsedBatch {
    DiffStreamParser::new().parse_chunk(data)
}

fn parse_split(data: &[u8], cuts: &[usize]) -> ParsedBatch {
    let mut parser = DiffStreamParser::new();
    let mut chunker = LineChunker::new(DIFF_SEPARATOR);
    let mut out = ParsedBatch::default();
    let mut start = 0;
    for &cut in cuts {
        let cut = cut.clamp(start, data.len());
        if let Some(chunk) = chunker.push(&data[start..cut]) {
            out.merge(parser.parse_chunk(&chunk));
        }
        start = cut;
    }
    if let Some(chunk) = chunker.push(&data[start..]) {
        out.merge(parser.parse_chunk(&chunk));
    }
    if let Some(rest) = chunker.finish() {
        out.merge(parser.parse_chunk(&rest));
    }
    out
}

// ===== Property 1: Chunk Boundaries =====

proptest! {
    #[test]
    fn parse_is_independent_of_read_boundaries(
        mut cuts in prop::collection::vec(0..PATCH.len(), 0..12)
    ) {
        cuts.sort_unstable();

        let whole = parse_whole(PATCH);
        let split = parse_split(PATCH, &cuts);

        prop_assert_eq!(split, whole);
    }

    #[test]
    fn rows_are_dense_from_zero(mut cuts in prop::collection::vec(0..PATCH.len(), 0..6)) {
        cuts.sort_unstable();

        let batch = parse_split(PATCH, &cuts);

        for (expected, (row, _)) in batch.lines.iter().enumerate() {
            prop_assert_eq!(*row, expected);
        }
    }

    #[test]
    fn split_records_never_yields_empty_records(
        records in prop::collection::vec("[a-z\n]{0,8}", 0..6)
    ) {
        let joined = records.join("\0");

        for record in split_records(joined.as_bytes(), 0) {
            prop_assert!(!record.is_empty());
            prop_assert!(!record.contains(&0));
        }
    }
}

#[test]
fn file_index_lists_each_header_once() {
    let batch = parse_whole(PATCH);
    let paths: Vec<&str> = batch.files.iter().map(|(path, _)| path).collect();

    assert_eq!(paths, vec!["src/main.rs", "new.txt", "docs/guide.md"]);
}

// ===== Property 2: Cursor Normalization =====

fn position() -> impl Strategy<Value = TextPosition> {
    (0usize..50, 0usize..80).prop_map(|(line, column)| TextPosition::new(line, column))
}

proptest! {
    #[test]
    fn cursor_begin_never_after_end(
        start in position(),
        moves in prop::collection::vec(position(), 1..10),
    ) {
        let mut cursor = TextCursor::new(RenderConfig::default());
        cursor.move_to(start);

        for pos in moves {
            cursor.select_to(pos);
            prop_assert!(cursor.begin() <= cursor.end());
            prop_assert_eq!(cursor.head(), pos);
            prop_assert_eq!(cursor.anchor(), start);
        }
    }
}

// ===== Property 3: Navigation Wraparound =====

fn matches_on_lines(lines: &[usize]) -> Vec<FindMatch> {
    let mut lines = lines.to_vec();
    lines.sort_unstable();
    lines.dedup();
    lines.into_iter().map(|l| FindMatch::new(l, 0, 1)).collect()
}

proptest! {
    #[test]
    fn next_wraps_after_count_steps(
        lines in prop::collection::vec(0usize..1000, 1..20),
        steps in 0usize..60,
    ) {
        let matches = matches_on_lines(&lines);
        let count = matches.len();
        let mut set = FindResultSet::new();
        set.merge(FindPart::All, matches, Some(0));

        for _ in 0..steps {
            set.next();
        }

        prop_assert_eq!(set.current_index(), Some(steps % count));
    }

    #[test]
    fn previous_undoes_next(
        lines in prop::collection::vec(0usize..1000, 1..20),
        start in 0usize..20,
    ) {
        let matches = matches_on_lines(&lines);
        let mut set = FindResultSet::new();
        set.merge(FindPart::All, matches, Some(start));
        let before = set.current();

        set.next();
        set.previous();

        prop_assert_eq!(set.current(), before);
    }
}

// ===== Property 4: Merge Ordering =====

proptest! {
    #[test]
    fn page_merges_stay_sorted_and_keep_current(
        page in prop::collection::vec(100usize..200, 1..10),
        before in prop::collection::vec(0usize..100, 0..10),
        after in prop::collection::vec(200usize..300, 0..10),
        current in 0usize..10,
    ) {
        let page = matches_on_lines(&page);
        let current = current.min(page.len() - 1);
        let current_match = page[current];
        let before = matches_on_lines(&before);
        let after = matches_on_lines(&after);
        let total = page.len() + before.len() + after.len();

        let mut set = FindResultSet::new();
        set.merge(FindPart::CurrentPage, page, Some(current));
        set.merge(FindPart::AfterCurPage, after, None);
        set.merge(FindPart::BeforeCurPage, before, None);

        prop_assert_eq!(set.len(), total);
        prop_assert!(set.matches().windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(set.current(), Some(current_match));
    }
}

//! Tests for AppState transitions, driven through a scripted runner.

use super::*;
use crate::search::FindStatus;
use crate::state::diff_view::COMMENTS_ENTRY;
use crate::test_harness::{AppHarness, ScriptedRunner, HEAD_SHA1, ROOT_SHA1};

// ===== Test Helpers =====

fn loaded(launch: LaunchOptions) -> AppHarness {
    let mut harness = AppHarness::new(ScriptedRunner::sample(), launch).expect("harness");
    harness.settle();
    harness
}

fn diff_texts(state: &AppState) -> Vec<String> {
    state
        .diff
        .lines()
        .lines()
        .iter()
        .map(|l| l.text().to_string())
        .collect()
}

fn files(state: &AppState) -> Vec<String> {
    state
        .file_entries()
        .into_iter()
        .map(|(path, _)| path.to_string())
        .collect()
}

// ===== Loading =====

#[test]
fn log_load_selects_first_commit_and_fetches_its_diff() {
    let harness = loaded(LaunchOptions::default());
    let state = harness.state();

    assert_eq!(state.log.len(), 2);
    assert_eq!(state.log.current_index(), Some(0));
    assert_eq!(state.diff.target(), Some(&DiffTarget::Commit(HEAD_SHA1.into())));
    assert_eq!(files(state), vec![COMMENTS_ENTRY, "src/lib.rs", "README.md"]);
    assert!(!state.is_loading_log());

    let calls = harness.calls();
    assert_eq!(calls[0][0], "log");
    assert_eq!(calls[1][0], "diff-tree");
    assert!(calls[1].contains(&HEAD_SHA1.to_string()));
}

#[test]
fn commit_header_names_parent_with_subject() {
    let harness = loaded(LaunchOptions::default());
    let texts = diff_texts(harness.state());

    assert!(texts[0].starts_with("Author: Ann <ann@example.com>"));
    assert!(texts[1].starts_with("Committer: Bob <bob@example.com>"));
    assert_eq!(texts[2], format!("Parent: {ROOT_SHA1} (Initial import)"));
    assert_eq!(texts[4], "    Rename old to new");
    assert!(texts.contains(&"+    new();".to_string()));
}

#[test]
fn moving_to_older_commit_lists_its_child() {
    let mut harness = loaded(LaunchOptions::default());

    harness.state_mut().log.move_current(1);
    harness.state_mut().load_current_diff();
    harness.settle();

    let texts = diff_texts(harness.state());
    assert!(texts.contains(&format!("Child: {HEAD_SHA1} (Rename old to new)")));
    assert!(texts.contains(&"+hello".to_string()));
    assert_eq!(files(harness.state()), vec![COMMENTS_ENTRY, "README.md"]);
}

#[test]
fn paths_restrict_log_and_diff() {
    let harness = loaded(LaunchOptions {
        paths: vec!["src".into()],
        ..LaunchOptions::default()
    });

    for call in harness.calls() {
        assert_eq!(call[call.len() - 2..], ["--".to_string(), "src".to_string()]);
    }
}

#[test]
fn revision_is_passed_to_log() {
    let harness = loaded(LaunchOptions {
        revision: Some("main~3".into()),
        ..LaunchOptions::default()
    });

    assert!(harness.calls()[0].contains(&"main~3".to_string()));
}

// ===== Local changes =====

#[test]
fn staged_changes_replace_the_first_commit() {
    let harness = loaded(LaunchOptions {
        local_changes: Some(DiffTarget::Index),
        ..LaunchOptions::default()
    });
    let state = harness.state();
    let texts = diff_texts(state);

    assert_eq!(state.diff.target(), Some(&DiffTarget::Index));
    assert!(!texts.iter().any(|t| t.starts_with("Author:")));
    assert_eq!(texts[0], format!("Parent: {HEAD_SHA1} (Rename old to new)"));
    assert!(texts.contains(&"    Local changes checked in to index but not committed".to_string()));
    assert!(texts.contains(&"+final".to_string()));
    assert_eq!(harness.calls()[1][..2], ["diff-index".to_string(), "--cached".to_string()]);
}

#[test]
fn failed_diff_is_reported_and_header_kept() {
    let runner = ScriptedRunner::new(crate::test_harness::sample_log());
    let mut harness = AppHarness::new(runner, LaunchOptions::default()).expect("harness");
    harness.settle();
    let state = harness.state();

    assert!(state.status().is_some_and(|s| s.contains("bad revision")));
    assert!(diff_texts(state)[0].starts_with("Author:"));
    assert!(harness.screen_contains("bad revision"));
}

// ===== Whitespace =====

#[test]
fn cycling_whitespace_reloads_with_the_new_flag() {
    let mut harness = loaded(LaunchOptions::default());

    harness.state_mut().cycle_whitespace();
    harness.settle();

    assert_eq!(harness.state().ignore_whitespace(), IgnoreWhitespace::Eol);
    let last = harness.calls().pop().expect("diff call");
    assert_eq!(last[0], "diff-tree");
    assert!(last.contains(&"--ignore-space-at-eol".to_string()));
    assert_eq!(files(harness.state()).len(), 3, "content reloaded, not appended");
}

#[test]
fn toggling_markers_updates_render_config() {
    let mut harness = loaded(LaunchOptions::default());

    harness.state_mut().toggle_show_whitespace();

    assert!(harness.state().render_config().show_whitespace);
    assert!(harness.state().diff.config().show_whitespace);
}

// ===== Files =====

#[test]
fn select_file_scrolls_to_its_block() {
    let mut harness = AppHarness::with_size(
        ScriptedRunner::sample(),
        LaunchOptions::default(),
        100,
        20,
    )
    .expect("harness");
    harness.settle();

    harness.state_mut().select_file(1);

    let state = harness.state();
    assert_eq!(state.file_selection, 1);
    assert_eq!(state.diff.lines().first_visible_line(), 8);
    assert_eq!(state.diff.current_file(), Some("src/lib.rs"));
}

#[test]
fn select_file_out_of_range_is_ignored() {
    let mut harness = loaded(LaunchOptions::default());

    harness.state_mut().select_file(9);

    assert_eq!(harness.state().file_selection, 0);
}

#[test]
fn scrolling_the_diff_follows_in_file_list() {
    let mut harness = AppHarness::with_size(
        ScriptedRunner::sample(),
        LaunchOptions::default(),
        100,
        20,
    )
    .expect("harness");
    harness.settle();

    harness.state_mut().diff.scroll_by(10);
    harness.state_mut().sync_file_selection();

    assert_eq!(harness.state().file_selection, 1);
}

// ===== Focus =====

#[test]
fn focus_cycles_through_panes() {
    let mut harness = loaded(LaunchOptions::default());
    let state = harness.state_mut();

    assert_eq!(state.focus, FocusPane::Log);
    state.cycle_focus();
    assert_eq!(state.focus, FocusPane::Files);
    state.cycle_focus();
    assert_eq!(state.focus, FocusPane::Diff);
    state.cycle_focus();
    assert_eq!(state.focus, FocusPane::Log);
}

// ===== Find =====

#[test]
fn launch_query_runs_once_the_diff_is_loaded() {
    let harness = loaded(LaunchOptions {
        find: Some("new".into()),
        ..LaunchOptions::default()
    });
    let state = harness.state();

    assert_eq!(state.find_input.query(), Some("new"));
    assert_eq!(
        state.find_status(),
        FindStatus::Results {
            count: 2,
            current: 0
        }
    );
}

#[test]
fn find_query_survives_a_commit_change() {
    let mut harness = loaded(LaunchOptions {
        find: Some("hello".into()),
        ..LaunchOptions::default()
    });
    assert!(matches!(
        harness.state().find_status(),
        FindStatus::Results { count: 2, .. }
    ));

    harness.state_mut().log.move_current(1);
    harness.state_mut().load_current_diff();
    harness.settle();

    assert_eq!(
        harness.state().find_status(),
        FindStatus::Results {
            count: 1,
            current: 0
        }
    );
}

#[test]
fn close_find_restores_focus() {
    let mut harness = loaded(LaunchOptions::default());
    harness.state_mut().focus = FocusPane::Diff;

    harness.state_mut().open_find(Some("old".into()), Instant::now());
    assert_eq!(harness.state().focus, FocusPane::Find);
    harness.state_mut().close_find();

    let state = harness.state();
    assert_eq!(state.focus, FocusPane::Diff);
    assert_eq!(state.find_input, FindInput::Inactive);
    assert_eq!(state.find_status(), FindStatus::Idle);
}

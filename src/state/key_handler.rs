//! Keyboard handling.
//!
//! Functions that transform AppState in response to key events. Keys typed
//! into the find bar are handled as text; everything else is resolved
//! through the key bindings and dispatched by focus.

use crate::model::KeyAction;
use crate::state::find_input::{self, FindOption};
use crate::state::{AppState, FocusPane};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Instant;

/// Lines scrolled by one wheel notch.
pub const WHEEL_LINES: isize = 3;

/// Handle one key event.
pub fn handle_key(state: &mut AppState, key: KeyEvent, now: Instant) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    if state.focus == FocusPane::Find && state.find_input.is_typing() {
        handle_find_key(state, key, now);
        return;
    }
    match state.bindings().get(key) {
        Some(action) => handle_action(state, action, now),
        None => {
            if key.code == KeyCode::Enter && state.focus == FocusPane::Files {
                let index = state.file_selection;
                state.select_file(index);
                state.focus = FocusPane::Diff;
            }
        }
    }
}

fn handle_find_key(state: &mut AppState, key: KeyEvent, now: Instant) {
    let input = std::mem::take(&mut state.find_input);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    let (input, edited) = match key.code {
        KeyCode::Esc => {
            state.find_input = input;
            state.close_find();
            return;
        }
        KeyCode::Enter => {
            state.find_input = find_input::handle_submit(input);
            state.focus = state.focus_before_find;
            if state.find_input.query().is_none() {
                state.diff.close_find();
            } else {
                state.diff.reveal_current_match();
                state.sync_file_selection();
            }
            return;
        }
        KeyCode::Char('c') if alt => (
            find_input::handle_toggle_option(input, FindOption::CaseSensitive),
            true,
        ),
        KeyCode::Char('w') if alt => (
            find_input::handle_toggle_option(input, FindOption::WholeWord),
            true,
        ),
        KeyCode::Char('r') if alt => (
            find_input::handle_toggle_option(input, FindOption::Regex),
            true,
        ),
        KeyCode::Char('c') if ctrl => {
            state.find_input = input;
            state.should_quit = true;
            return;
        }
        KeyCode::Char(ch) if !ctrl && !alt => (find_input::handle_char_input(input, ch), true),
        KeyCode::Backspace => (find_input::handle_backspace(input), true),
        KeyCode::Left => (find_input::handle_cursor_left(input), false),
        KeyCode::Right => (find_input::handle_cursor_right(input), false),
        _ => (input, false),
    };

    state.find_input = input;
    if edited {
        state.request_find(now);
    }
}

/// Apply a bound action.
pub fn handle_action(state: &mut AppState, action: KeyAction, now: Instant) {
    match action {
        KeyAction::Quit => state.should_quit = true,
        KeyAction::CycleFocus => state.cycle_focus(),

        KeyAction::ScrollUp
        | KeyAction::ScrollDown
        | KeyAction::PageUp
        | KeyAction::PageDown
        | KeyAction::ScrollToTop
        | KeyAction::ScrollToBottom
        | KeyAction::ScrollLeft
        | KeyAction::ScrollRight => handle_scroll_action(state, action),

        KeyAction::NextFile => {
            let next = state.file_selection + 1;
            state.select_file(next);
        }
        KeyAction::PrevFile => {
            if let Some(previous) = state.file_selection.checked_sub(1) {
                state.select_file(previous);
            }
        }

        KeyAction::StartFind => state.open_find(None, now),
        KeyAction::FindSelection => {
            let selected = state.diff.selected_text_first_line();
            state.open_find(selected, now);
        }
        KeyAction::NextMatch => {
            if state.diff.next_match().is_some() {
                state.sync_file_selection();
            }
        }
        KeyAction::PrevMatch => {
            if state.diff.previous_match().is_some() {
                state.sync_file_selection();
            }
        }
        KeyAction::CancelFind => {
            if state.find_input.query().is_some() {
                state.close_find();
            } else {
                state.diff.clear_selection();
            }
        }

        KeyAction::SelectAll => state.diff.select_all(),
        KeyAction::CycleWhitespace => state.cycle_whitespace(),
        KeyAction::ToggleShowWhitespace => state.toggle_show_whitespace(),
    }
}

/// Scroll the focused pane.
///
/// In the log, vertical moves change the current commit and load its diff.
/// In the file list they move the selection. Horizontal moves always apply
/// to the diff.
pub fn handle_scroll_action(state: &mut AppState, action: KeyAction) {
    match action {
        KeyAction::ScrollLeft => {
            state.diff.scroll_horizontal(-1);
            return;
        }
        KeyAction::ScrollRight => {
            state.diff.scroll_horizontal(1);
            return;
        }
        _ => {}
    }

    match state.focus {
        FocusPane::Log => {
            let page = state.log.visible_rows().len().max(1) as isize;
            let last = state.log.len().saturating_sub(1);
            let changed = match action {
                KeyAction::ScrollUp => state.log.move_current(-1),
                KeyAction::ScrollDown => state.log.move_current(1),
                KeyAction::PageUp => state.log.move_current(-page),
                KeyAction::PageDown => state.log.move_current(page),
                KeyAction::ScrollToTop => state.log.set_current_index(Some(0)),
                KeyAction::ScrollToBottom => state.log.set_current_index(Some(last)),
                _ => false,
            };
            if changed {
                state.load_current_diff();
            }
        }
        FocusPane::Files => {
            let count = state.diff.files().len();
            if count == 0 {
                return;
            }
            let current = state.file_selection;
            let target = match action {
                KeyAction::ScrollUp | KeyAction::PageUp => current.saturating_sub(1),
                KeyAction::ScrollDown | KeyAction::PageDown => (current + 1).min(count - 1),
                KeyAction::ScrollToTop => 0,
                KeyAction::ScrollToBottom => count - 1,
                _ => current,
            };
            state.select_file(target);
        }
        FocusPane::Diff | FocusPane::Find => {
            let page = state.diff.page_height().max(1) as isize;
            match action {
                KeyAction::ScrollUp => state.diff.scroll_by(-1),
                KeyAction::ScrollDown => state.diff.scroll_by(1),
                KeyAction::PageUp => state.diff.scroll_by(-page),
                KeyAction::PageDown => state.diff.scroll_by(page),
                KeyAction::ScrollToTop => state.diff.scroll_to_top(),
                KeyAction::ScrollToBottom => state.diff.scroll_to_bottom(),
                _ => {}
            }
            state.sync_file_selection();
        }
    }
}

#[cfg(test)]
#[path = "key_handler_tests.rs"]
mod tests;

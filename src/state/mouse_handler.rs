//! Mouse event handler.
//!
//! Functions that transform AppState in response to mouse events. The view
//! reports where each pane was drawn as [`PaneAreas`]; coordinates are
//! translated into pane-relative cells here.

use crate::state::key_handler::WHEEL_LINES;
use crate::state::{AppState, FocusPane};
use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use std::time::Instant;

/// Inner areas (inside borders) of the three panes from the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaneAreas {
    /// Commit list rows.
    pub log: Rect,
    /// File list rows.
    pub files: Rect,
    /// Diff text.
    pub diff: Rect,
}

/// First file list row drawn when `selection` must be visible in `height` rows.
pub fn file_list_offset(selection: usize, height: usize) -> usize {
    (selection + 1).saturating_sub(height.max(1))
}

/// Handle one mouse event.
pub fn handle_mouse(
    state: &mut AppState,
    event: MouseEvent,
    areas: &PaneAreas,
    now: Instant,
) {
    let at = Position::new(event.column, event.row);

    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if areas.diff.contains(at) {
                let (x, y) = relative(at, areas.diff);
                let line = state.diff.lines().first_visible_line() + y;
                let kind = state.clicks.register(line, now);
                let extend = event.modifiers.contains(KeyModifiers::SHIFT);
                state.diff.click(x, y, kind, extend);
                state.dragging = true;
                state.focus = FocusPane::Diff;
            } else if areas.log.contains(at) {
                let (_, y) = relative(at, areas.log);
                if let Some(row) = state.log.row_at_y(y) {
                    if state.log.set_current_index(Some(row)) {
                        state.load_current_diff();
                    }
                }
                state.focus = FocusPane::Log;
            } else if areas.files.contains(at) {
                let (_, y) = relative(at, areas.files);
                let offset = file_list_offset(state.file_selection, areas.files.height as usize);
                state.select_file(offset + y);
                state.focus = FocusPane::Files;
            }
        }
        MouseEventKind::Drag(MouseButton::Left) if state.dragging => {
            let x = event.column.saturating_sub(areas.diff.x) as usize;
            let y = event.row as isize - areas.diff.y as isize;
            state.diff.drag(x, y);
            state.sync_file_selection();
        }
        MouseEventKind::Up(MouseButton::Left) => state.dragging = false,
        MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
            let delta = if event.kind == MouseEventKind::ScrollUp {
                -WHEEL_LINES
            } else {
                WHEEL_LINES
            };
            if areas.diff.contains(at) {
                state.diff.scroll_by(delta);
                state.sync_file_selection();
            } else if areas.log.contains(at) {
                state.log.scroll_by(delta);
            }
        }
        _ => {}
    }
}

fn relative(at: Position, area: Rect) -> (usize, usize) {
    ((at.x - area.x) as usize, (at.y - area.y) as usize)
}

#[cfg(test)]
#[path = "mouse_handler_tests.rs"]
mod tests;

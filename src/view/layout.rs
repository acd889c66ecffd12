//! Pane layout.
//!
//! Log on top; diff and file list side by side below; one status or find
//! line at the bottom. Areas are computed before drawing so the state can
//! learn its viewport sizes and the mouse handler can hit-test the last frame.

use crate::config::IgnoreWhitespace;
use crate::state::{AppState, FindInput, FocusPane, PaneAreas};
use crate::view::styles::DiffStyles;
use crate::view::diff_pane::DiffPane;
use crate::view::find_bar::FindBar;
use crate::view::log_pane::LogPane;
use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Outer areas of every part of the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameLayout {
    /// Commit list, with border.
    pub log: Rect,
    /// Diff text, with border.
    pub diff: Rect,
    /// File list, with border.
    pub files: Rect,
    /// Status or find line.
    pub bar: Rect,
}

impl FrameLayout {
    /// Split `area`.
    pub fn new(area: Rect) -> Self {
        let [content, bar] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .areas(area);
        let [log, lower] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .areas(content);
        let [diff, files] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
            .areas(lower);
        Self {
            log,
            diff,
            files,
            bar,
        }
    }

    /// Areas inside the borders.
    pub fn inner(&self) -> PaneAreas {
        let margin = Margin::new(1, 1);
        PaneAreas {
            log: self.log.inner(margin),
            files: self.files.inner(margin),
            diff: self.diff.inner(margin),
        }
    }
}

/// Give the panes their sizes and parse what is about to be painted.
pub fn prepare_frame(state: &mut AppState, layout: &FrameLayout) {
    let inner = layout.inner();
    state.log.set_viewport(inner.log.height as usize);
    state.log.materialize_visible();
    state
        .diff
        .set_viewport(inner.diff.width as usize, inner.diff.height as usize);
    state.diff.prepare_paint();
}

/// Draw the whole screen.
pub fn render_layout(
    frame: &mut Frame,
    state: &AppState,
    layout: &FrameLayout,
    styles: DiffStyles,
) {
    frame.render_widget(
        LogPane::new(&state.log, styles, state.focus == FocusPane::Log),
        layout.log,
    );
    frame.render_widget(
        DiffPane::new(&state.diff, styles, state.focus == FocusPane::Diff),
        layout.diff,
    );
    render_file_list(frame, layout.files, state, &styles);

    if state.find_input == FindInput::Inactive {
        render_status_bar(frame, layout.bar, state, &styles);
    } else {
        frame.render_widget(
            FindBar::new(
                &state.find_input,
                state.find_status(),
                state.diff.find().error(),
                styles,
            ),
            layout.bar,
        );
    }
}

fn render_file_list(frame: &mut Frame, area: Rect, state: &AppState, styles: &DiffStyles) {
    let focused = state.focus == FocusPane::Files;
    let items: Vec<ListItem> = state
        .file_entries()
        .into_iter()
        .map(|(path, _)| ListItem::new(path.to_string()))
        .collect();
    let count = items.len();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles.border_style(focused))
        .title(format!(" Files ({}) ", count.saturating_sub(1)));
    let list = List::new(items)
        .block(block)
        .highlight_style(styles.selected_row(focused));

    let height = area.height.saturating_sub(2) as usize;
    let mut list_state = ListState::default()
        .with_offset(crate::state::file_list_offset(state.file_selection, height))
        .with_selected((count > 0).then_some(state.file_selection));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, styles: &DiffStyles) {
    let mut spans = Vec::new();
    if let Some(status) = state.status() {
        spans.push(Span::styled(status.to_string(), styles.error()));
        spans.push(Span::raw("  "));
    } else if state.is_loading_log() || state.diff.is_loading() {
        spans.push(Span::raw("Loading...  "));
    }
    spans.push(Span::styled(
        format!(
            "whitespace: {}  q quit  / find  n/N next/prev  Tab focus  w whitespace",
            whitespace_label(state.ignore_whitespace())
        ),
        styles.dim(),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn whitespace_label(mode: IgnoreWhitespace) -> &'static str {
    match mode {
        IgnoreWhitespace::None => "shown",
        IgnoreWhitespace::Eol => "ignore eol",
        IgnoreWhitespace::Change => "ignore changes",
    }
}

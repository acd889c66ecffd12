//! Diff pane: paints visible lines through [`TerminalSurface`].

use crate::source::DiffTarget;
use crate::state::DiffViewState;
use crate::view::log_pane::SHORT_SHA1_LEN;
use crate::view::styles::DiffStyles;
use crate::view::surface::TerminalSurface;
use crate::view_state::{RenderSurface, TextRun};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Borders, Widget},
};

/// Diff pane widget.
pub struct DiffPane<'a> {
    diff: &'a DiffViewState,
    styles: DiffStyles,
    focused: bool,
}

impl<'a> DiffPane<'a> {
    /// Widget over `diff`.
    pub fn new(diff: &'a DiffViewState, styles: DiffStyles, focused: bool) -> Self {
        Self {
            diff,
            styles,
            focused,
        }
    }

    fn title(&self) -> String {
        let mut title = match self.diff.target() {
            Some(DiffTarget::Commit(sha1)) => sha1.chars().take(SHORT_SHA1_LEN).collect(),
            Some(DiffTarget::Index) => "index".to_string(),
            Some(DiffTarget::WorkingTree) => "working tree".to_string(),
            None => "Diff".to_string(),
        };
        if let Some(file) = self.diff.current_file() {
            title.push_str(" : ");
            title.push_str(file);
        }
        if self.diff.is_loading() {
            title.push_str(" [loading]");
        }
        format!(" {title} ")
    }
}

impl Widget for DiffPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.styles.border_style(self.focused))
            .title(self.title());
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = self.diff.lines();
        let config = *self.diff.config();
        let first = lines.first_visible_line();
        let mut surface = TerminalSurface::new(buf, self.styles);

        for y in 0..inner.height {
            let index = first + y as usize;
            let Some(line) = lines.line(index) else {
                break;
            };
            let formats = self.diff.format_ranges(index, self.focused);
            let run = TextRun {
                text: line.text(),
                kind: line.kind(),
                formats: &formats,
                x: inner.x,
                y: inner.y + y,
                width: inner.width,
                skip_columns: self.diff.h_offset(),
            };
            surface.draw_formatted_run(&run, &config);
        }
    }
}

//! Commit list pane.

use crate::state::LogViewState;
use crate::view::styles::DiffStyles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Width of the abbreviated sha1 column.
pub const SHORT_SHA1_LEN: usize = 8;

// ===== LogPane Widget =====

/// One row per commit: short sha1, subject, author and date.
///
/// Only rows already parsed are drawn; the caller runs
/// [`LogViewState::materialize_visible`] before painting.
pub struct LogPane<'a> {
    log: &'a LogViewState,
    styles: DiffStyles,
    focused: bool,
}

impl<'a> LogPane<'a> {
    /// Widget over `log`.
    pub fn new(log: &'a LogViewState, styles: DiffStyles, focused: bool) -> Self {
        Self {
            log,
            styles,
            focused,
        }
    }
}

impl Widget for LogPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match self.log.current_index() {
            Some(current) => format!(" Log ({}/{}) ", current + 1, self.log.len()),
            None => format!(" Log ({}) ", self.log.len()),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.styles.border_style(self.focused))
            .title(title);

        let lines: Vec<Line> = self
            .log
            .visible_rows()
            .map(|row| {
                let Some(commit) = self.log.peek(row) else {
                    return Line::default();
                };
                let short: String = commit.sha1.chars().take(SHORT_SHA1_LEN).collect();
                let line = Line::from(vec![
                    Span::styled(short, self.styles.sha1()),
                    Span::raw(" "),
                    Span::raw(commit.summary().to_string()),
                    Span::raw("  "),
                    Span::styled(
                        format!("{} {}", commit.author, commit.author_date),
                        self.styles.dim(),
                    ),
                ]);
                if Some(row) == self.log.current_index() {
                    line.style(self.styles.selected_row(self.focused))
                } else {
                    line
                }
            })
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::styles::ColorConfig;

    fn record(sha1: &str, subject: &str) -> Vec<u8> {
        [sha1, subject, "Ann", "2024-01-01", "Ann", "2024-01-01", ""]
            .join("\x01")
            .into_bytes()
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn renders_visible_commits() {
        let mut log = LogViewState::new();
        log.set_records(vec![
            record("0123456789abcdef", "Add parser"),
            record("fedcba9876543210", "Initial import"),
        ]);
        log.set_viewport(2);
        log.set_current_index(Some(0));
        log.materialize_visible();

        let area = Rect::new(0, 0, 60, 4);
        let mut buf = Buffer::empty(area);
        LogPane::new(&log, DiffStyles::with_color_config(ColorConfig::new(false)), true)
            .render(area, &mut buf);

        assert!(row_text(&buf, 0).contains("Log (1/2)"));
        assert!(row_text(&buf, 1).contains("01234567 Add parser  Ann 2024-01-01"));
        assert!(row_text(&buf, 2).contains("fedcba98 Initial import"));
    }

    #[test]
    fn unparsed_rows_are_blank() {
        let mut log = LogViewState::new();
        log.set_records(vec![record("0123456789abcdef", "Add parser")]);
        log.set_viewport(1);

        let area = Rect::new(0, 0, 40, 3);
        let mut buf = Buffer::empty(area);
        LogPane::new(&log, DiffStyles::with_color_config(ColorConfig::new(false)), false)
            .render(area, &mut buf);

        assert!(!row_text(&buf, 1).contains("Add parser"));
    }
}

//! Find bar widget: query, option toggles and match count.

use crate::search::{FindError, FindFlags, FindStatus};
use crate::state::FindInput;
use crate::view::styles::DiffStyles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Single-line find bar.
pub struct FindBar<'a> {
    input: &'a FindInput,
    status: FindStatus,
    error: Option<&'a FindError>,
    styles: DiffStyles,
}

impl<'a> FindBar<'a> {
    /// Bar for `input` reporting `status`.
    pub fn new(
        input: &'a FindInput,
        status: FindStatus,
        error: Option<&'a FindError>,
        styles: DiffStyles,
    ) -> Self {
        Self {
            input,
            status,
            error,
            styles,
        }
    }
}

/// Count text for the right-hand side of the bar.
pub fn status_text(status: FindStatus) -> String {
    match status {
        FindStatus::Idle => String::new(),
        FindStatus::Searching => "Searching...".to_string(),
        FindStatus::NoResults => "No results".to_string(),
        FindStatus::Results { count, current } => format!("{} of {}", current + 1, count),
    }
}

fn option_spans(flags: FindFlags) -> Vec<Span<'static>> {
    let toggle = |on: bool, label: &'static str| {
        let style = if on {
            Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        Span::styled(label, style)
    };
    vec![
        Span::raw(" "),
        toggle(flags.case_sensitive, "Aa"),
        Span::raw(" "),
        toggle(flags.whole_word, "W"),
        Span::raw(" "),
        toggle(flags.use_regex, ".*"),
    ]
}

impl Widget for FindBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::raw("Find: ")];
        match self.input {
            FindInput::Typing { query, cursor, .. } => {
                // cursor is a char index; the char under it is drawn inverted
                let before: String = query.chars().take(*cursor).collect();
                let mut rest = query.chars().skip(*cursor);
                let under = rest.next().map_or_else(|| " ".to_string(), String::from);
                let after: String = rest.collect();
                spans.push(Span::raw(before));
                spans.push(Span::styled(
                    under,
                    Style::default().add_modifier(Modifier::REVERSED),
                ));
                spans.push(Span::raw(after));
            }
            FindInput::Active { query, .. } => spans.push(Span::raw(query.clone())),
            FindInput::Inactive => return,
        }

        spans.extend(option_spans(self.input.flags().unwrap_or_default()));
        spans.push(Span::raw("  "));
        match self.error {
            Some(error) => spans.push(Span::styled(error.to_string(), self.styles.error())),
            None => spans.push(Span::styled(status_text(self.status), self.styles.dim())),
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::styles::ColorConfig;

    fn render(input: &FindInput, status: FindStatus) -> String {
        let area = Rect::new(0, 0, 50, 1);
        let mut buf = Buffer::empty(area);
        FindBar::new(
            input,
            status,
            None,
            DiffStyles::with_color_config(ColorConfig::new(false)),
        )
        .render(area, &mut buf);
        (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect()
    }

    #[test]
    fn status_texts() {
        assert_eq!(status_text(FindStatus::Idle), "");
        assert_eq!(status_text(FindStatus::Searching), "Searching...");
        assert_eq!(status_text(FindStatus::NoResults), "No results");
        assert_eq!(
            status_text(FindStatus::Results {
                count: 7,
                current: 2
            }),
            "3 of 7"
        );
    }

    #[test]
    fn typing_shows_query_and_count() {
        let input = FindInput::Typing {
            query: "foo".to_string(),
            cursor: 3,
            flags: FindFlags::default(),
        };

        let row = render(&input, FindStatus::Results { count: 2, current: 0 });

        assert!(row.starts_with("Find: foo "));
        assert!(row.contains("Aa W .*"));
        assert!(row.contains("1 of 2"));
    }

    #[test]
    fn inactive_bar_draws_nothing() {
        let row = render(&FindInput::Inactive, FindStatus::Idle);

        assert_eq!(row.trim(), "");
    }
}

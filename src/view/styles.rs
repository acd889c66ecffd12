//! Diff line styling.
//!
//! Base styles come from the line kind and, for patch text, from the first
//! characters of the line. Format ranges (selection, find matches, keyword
//! highlights) are patched on top.

use crate::model::LineKind;
use crate::view_state::FormatKind;
use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Whether to emit colors at all.
///
/// Disabled by the `NO_COLOR` environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Read `NO_COLOR` from the environment.
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    /// Explicit setting.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// `true` when colors are emitted.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== DiffStyles =====

/// Style table for the diff, log and file panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffStyles {
    colors: bool,
}

impl Default for DiffStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::from_env())
    }
}

impl DiffStyles {
    /// Styles honouring `config`.
    pub fn with_color_config(config: ColorConfig) -> Self {
        Self {
            colors: config.colors_enabled(),
        }
    }

    fn fg(&self, color: Color) -> Style {
        if self.colors {
            Style::default().fg(color)
        } else {
            Style::default()
        }
    }

    /// Base style of a line.
    pub fn line_style(&self, kind: LineKind, text: &str) -> Style {
        match kind {
            LineKind::File | LineKind::FileInfo => {
                let style = Style::default().add_modifier(Modifier::BOLD);
                if self.colors {
                    style.bg(Color::Indexed(236))
                } else {
                    style
                }
            }
            LineKind::Diff => self.patch_style(text),
            LineKind::Author => self.fg(Color::Blue),
            LineKind::Sha1 { .. } => self.fg(Color::Magenta).add_modifier(Modifier::UNDERLINED),
            LineKind::Text => Style::default(),
        }
    }

    fn patch_style(&self, text: &str) -> Style {
        if text.starts_with("@@") || text.starts_with("\\ No newline") {
            self.fg(Color::Cyan)
        } else if text.starts_with("++") || text.starts_with(" +") {
            self.fg(Color::Green).add_modifier(Modifier::BOLD)
        } else if text.starts_with('+') {
            self.fg(Color::Green)
        } else if text.starts_with('-') || text.starts_with(" -") {
            self.fg(Color::Red)
        } else if text.starts_with("  > ") {
            // submodule log
            self.fg(Color::Yellow)
        } else {
            Style::default()
        }
    }

    /// Overlay for a format range.
    pub fn format_style(&self, kind: FormatKind) -> Style {
        if !self.colors {
            return match kind {
                FormatKind::FindMatch { current: true } => {
                    Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
                }
                FormatKind::Highlight => Style::default().add_modifier(Modifier::UNDERLINED),
                _ => Style::default().add_modifier(Modifier::REVERSED),
            };
        }
        match kind {
            FormatKind::Selection { focused: true } => {
                Style::default().bg(Color::Blue).fg(Color::White)
            }
            FormatKind::Selection { focused: false } => Style::default().bg(Color::DarkGray),
            FormatKind::FindMatch { current: false } => {
                Style::default().bg(Color::Yellow).fg(Color::Black)
            }
            FormatKind::FindMatch { current: true } => Style::default()
                .bg(Color::LightRed)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            FormatKind::Highlight => Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Marker glyphs for whitespace.
    pub fn whitespace_style(&self) -> Style {
        self.fg(Color::DarkGray)
    }

    /// Border of a pane, brighter when focused.
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            self.fg(Color::Cyan)
        } else {
            Style::default()
        }
    }

    /// Current row of a list.
    pub fn selected_row(&self, focused: bool) -> Style {
        match (self.colors, focused) {
            (true, true) => Style::default().bg(Color::Blue).fg(Color::White),
            (true, false) => Style::default().bg(Color::DarkGray),
            (false, _) => Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    /// Short sha1 in the log pane.
    pub fn sha1(&self) -> Style {
        self.fg(Color::Yellow)
    }

    /// Author and date in the log pane.
    pub fn dim(&self) -> Style {
        self.fg(Color::Gray)
    }

    /// Error text in the status bar.
    pub fn error(&self) -> Style {
        self.fg(Color::Red)
    }
}

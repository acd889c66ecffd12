//! Terminal implementation of the render surface.
//!
//! Paints [`TextRun`]s into a ratatui [`Buffer`]. One char column maps to
//! one or two cells; tabs expand to the next tab stop. Format ranges are in
//! char columns and later ranges win where they overlap.

use super::styles::DiffStyles;
use crate::config::RenderConfig;
use crate::view_state::{char_width, ColumnMeasure, RenderSurface, TextMeasure, TextRun};
use ratatui::buffer::Buffer;
use ratatui::style::Style;

const TAB_MARKER: &str = "→";
const SPACE_MARKER: &str = "·";
const CR_MARKER: &str = "␍";
const CONTROL_MARKER: &str = "�";

/// Render surface over a frame buffer.
#[derive(Debug)]
pub struct TerminalSurface<'a> {
    buf: &'a mut Buffer,
    styles: DiffStyles,
}

impl<'a> TerminalSurface<'a> {
    /// Surface painting into `buf` with `styles`.
    pub fn new(buf: &'a mut Buffer, styles: DiffStyles) -> Self {
        Self { buf, styles }
    }

    fn put(&mut self, x: u16, y: u16, symbol: &str, style: Style) {
        if let Some(cell) = self.buf.cell_mut((x, y)) {
            cell.set_symbol(symbol).set_style(style);
        }
    }

    // Cell hidden behind a wide glyph.
    fn cover(&mut self, x: u16, y: u16, style: Style) {
        if let Some(cell) = self.buf.cell_mut((x, y)) {
            cell.reset();
            cell.set_style(style);
        }
    }
}

impl TextMeasure for TerminalSurface<'_> {
    fn measure_width(&self, text: &str, config: &RenderConfig) -> usize {
        ColumnMeasure.measure_width(text, config)
    }

    fn column_at_x(&self, text: &str, x: usize, config: &RenderConfig) -> usize {
        ColumnMeasure.column_at_x(text, x, config)
    }
}

impl RenderSurface for TerminalSurface<'_> {
    fn draw_formatted_run(&mut self, run: &TextRun<'_>, config: &RenderConfig) {
        let base = self.styles.line_style(run.kind, run.text);
        let left = run.skip_columns;
        let right = left + run.width as usize;

        for offset in 0..run.width {
            self.put(run.x + offset, run.y, " ", base);
        }

        let mut at = 0;
        for (column, ch) in run.text.chars().enumerate() {
            if at >= right {
                break;
            }
            let width = char_width(ch, at, config.tab_width);
            if width == 0 {
                continue;
            }

            let mut style = base;
            for range in run.formats.iter().filter(|r| r.contains(column)) {
                style = style.patch(self.styles.format_style(range.kind));
            }
            let marker = style.patch(self.styles.whitespace_style());

            let fits = at >= left && at + width <= right;
            let x = |cell: usize| run.x + (cell - left) as u16;
            match ch {
                '\t' => {
                    for cell in (at..at + width).filter(|c| (left..right).contains(c)) {
                        if cell == at && config.show_whitespace {
                            self.put(x(cell), run.y, TAB_MARKER, marker);
                        } else {
                            self.put(x(cell), run.y, " ", style);
                        }
                    }
                }
                ' ' if config.show_whitespace && fits => {
                    self.put(x(at), run.y, SPACE_MARKER, marker);
                }
                // marked even without show_whitespace
                '\r' if fits => self.put(x(at), run.y, CR_MARKER, marker),
                c if c.is_control() && fits => self.put(x(at), run.y, CONTROL_MARKER, marker),
                _ if fits => {
                    let mut symbol = [0u8; 4];
                    self.put(x(at), run.y, ch.encode_utf8(&mut symbol), style);
                    for cell in at + 1..at + width {
                        self.cover(x(cell), run.y, style);
                    }
                }
                _ => {
                    // wide glyph cut by an edge
                    for cell in (at..at + width).filter(|c| (left..right).contains(c)) {
                        self.put(x(cell), run.y, " ", style);
                    }
                }
            }
            at += width;
        }
    }
}

//! Terminal shell around [`AppState`].
//!
//! Owns the terminal: raw mode, the alternate screen and mouse capture. Each
//! frame sizes the panes, lets the state materialize what is visible and then
//! paints the log, diff, file list and bar widgets.

mod diff_pane;
mod find_bar;
pub mod layout;
mod log_pane;
pub mod styles;
pub mod surface;

pub use diff_pane::DiffPane;
pub use find_bar::{status_text, FindBar};
pub use layout::FrameLayout;
pub use log_pane::LogPane;
pub use styles::{ColorConfig, DiffStyles};
pub use surface::TerminalSurface;

use crate::model::AppError;
use crate::state::{handle_key, handle_mouse, AppState, PaneAreas};
use crossterm::{
    event::{self, Event, KeyEvent, MouseEvent},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Failure of the terminal shell.
#[derive(Debug, Error)]
pub enum TuiError {
    /// Terminal setup, drawing or event reading failed.
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Error raised by the application core.
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

/// The diff viewer bound to a terminal.
///
/// Generic over the backend; tests draw into a `TestBackend`.
pub struct TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    terminal: Terminal<B>,
    app_state: AppState,
    styles: DiffStyles,
    /// Pane areas of the last frame, for mouse hit-testing.
    areas: PaneAreas,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Take over stdout: raw mode, alternate screen, mouse capture.
    pub fn new(app_state: AppState) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(event::EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            app_state,
            styles: DiffStyles::default(),
            areas: PaneAreas::default(),
        })
    }

    /// Start loading the log and process events.
    ///
    /// Returns when the user quits. Between input events the background
    /// fetches and searches are polled; the screen is redrawn only when
    /// something changed.
    pub fn run(&mut self) -> Result<(), TuiError> {
        const POLL_INTERVAL: Duration = Duration::from_millis(50);

        self.app_state.start();
        self.draw()?;

        loop {
            if event::poll(POLL_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(width, height) => debug!(width, height, "Resized"),
                    _ => continue,
                }
                if self.app_state.should_quit {
                    return Ok(());
                }
                self.draw()?;
            }

            if self.app_state.poll(Instant::now()) {
                self.draw()?;
            }
        }
    }
}

impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    fn handle_key(&mut self, key: KeyEvent) {
        handle_key(&mut self.app_state, key, Instant::now());
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        handle_mouse(&mut self.app_state, mouse, &self.areas, Instant::now());
    }

    /// Render the current frame
    ///
    /// Pane sizes are pushed into the state first so scrolling, hit-testing
    /// and the find page window agree with what is painted.
    fn draw(&mut self) -> Result<(), TuiError> {
        let size = self.terminal.size()?;
        let frame_area = Rect::new(0, 0, size.width.max(1), size.height);
        let layout = FrameLayout::new(frame_area);

        layout::prepare_frame(&mut self.app_state, &layout);
        self.areas = layout.inner();

        let state = &self.app_state;
        let styles = self.styles;
        self.terminal
            .draw(|frame| layout::render_layout(frame, state, &layout, styles))?;
        Ok(())
    }
}

// ===== Test Helpers =====

#[cfg(test)]
impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    /// Create TuiApp over an existing terminal (test-only constructor)
    pub(crate) fn new_for_test(terminal: Terminal<B>, app_state: AppState) -> Self {
        Self {
            terminal,
            app_state,
            styles: DiffStyles::with_color_config(ColorConfig::new(false)),
            areas: PaneAreas::default(),
        }
    }

    pub(crate) fn app_state(&self) -> &AppState {
        &self.app_state
    }

    pub(crate) fn app_state_mut(&mut self) -> &mut AppState {
        &mut self.app_state
    }

    pub(crate) fn handle_key_test(&mut self, key: KeyEvent) {
        self.handle_key(key);
    }

    pub(crate) fn handle_mouse_test(&mut self, mouse: MouseEvent) {
        self.handle_mouse(mouse);
    }

    pub(crate) fn render_test(&mut self) -> Result<(), TuiError> {
        self.draw()
    }

    pub(crate) fn areas(&self) -> PaneAreas {
        self.areas
    }

    pub(crate) fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

/// Show `app_state` until the user quits.
///
/// The terminal is restored even when the loop fails. Install logging first;
/// nothing may be printed to the terminal once this runs.
pub fn run(app_state: AppState) -> Result<(), TuiError> {
    let mut app = TuiApp::new(app_state)?;
    let result = app.run();
    restore_terminal()?;
    result
}

/// Undo [`TuiApp::new`].
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(event::DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let err: TuiError = io::Error::other("closed").into();
        assert!(matches!(err, TuiError::Io(_)));
    }

    #[test]
    fn app_errors_convert() {
        let app_err = AppError::Terminal(io::Error::other("gone"));
        let tui_err: TuiError = app_err.into();
        assert!(tui_err.to_string().starts_with("Application error"));
    }
}

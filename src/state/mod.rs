//! UI state machine.
//!
//! State transitions are plain functions over [`AppState`], testable without
//! a terminal. Background work (log and diff fetches, searches) is polled,
//! never awaited, so every transition returns immediately.

pub mod app_state;
pub mod diff_view;
pub mod find_input;
pub mod key_handler;
pub mod log_view;
pub mod mouse_handler;

// Re-export for convenience
pub use app_state::{AppState, FocusPane, LaunchOptions};
pub use diff_view::{DiffViewState, FetchProgress, HighlightField, KeywordHighlight};
pub use find_input::{FindInput, FindOption};
pub use key_handler::{handle_action, handle_key, handle_scroll_action};
pub use log_view::LogViewState;
pub use mouse_handler::{file_list_offset, handle_mouse, PaneAreas};

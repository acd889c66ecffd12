//! Keyboard actions independent of key bindings.

/// What the user asked for, as opposed to which key they pressed.
///
/// The mapping from `crossterm::event::KeyEvent` to `KeyAction` lives in
/// `KeyBindings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Scrolling
    /// One line up in the focused pane. Default: k/↑
    ScrollUp,
    /// One line down in the focused pane. Default: j/↓
    ScrollDown,
    /// Scroll the diff left. Default: h/←
    ScrollLeft,
    /// Scroll the diff right. Default: l/→
    ScrollRight,
    /// One page up. Default: Ctrl+u/Page Up
    PageUp,
    /// One page down. Default: Ctrl+d/Page Down
    PageDown,
    /// Jump to the top. Default: g/Home
    ScrollToTop,
    /// Jump to the bottom. Default: G/End
    ScrollToBottom,

    // Panes
    /// Log → Files → Diff. Default: Tab
    CycleFocus,
    /// Scroll the diff to the next file block. Default: ]
    NextFile,
    /// Scroll the diff to the previous file block. Default: [
    PrevFile,

    // Find
    /// Open the find bar. Default: /, Ctrl+f
    StartFind,
    /// Open the find bar pre-filled with the selection. Default: *
    FindSelection,
    /// Next match. Default: n
    NextMatch,
    /// Previous match. Default: N
    PrevMatch,
    /// Close the find bar and drop the matches. Default: Esc
    CancelFind,

    // Selection
    /// Select the whole diff. Default: Ctrl+a
    SelectAll,

    // Display
    /// none → eol → change → none. Default: w
    CycleWhitespace,
    /// Toggle whitespace markers. Default: W
    ToggleShowWhitespace,

    // Application
    /// Exit. Default: q/Ctrl+c
    Quit,
}

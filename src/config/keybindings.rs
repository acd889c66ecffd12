//! Keyboard bindings.

use crate::model::key_action::KeyAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Maps keyboard events to actions.
///
/// Defaults are vim-style with arrow and paging keys as alternatives.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Action bound to `key`.
    ///
    /// Only code and modifiers take part in the lookup, so press, repeat and
    /// release events of one key resolve alike.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        self.bindings
            .get(&KeyEvent::new(key.code, key.modifiers))
            .copied()
    }

    /// Bind `key` to `action`, replacing any earlier binding of that key.
    pub fn bind(&mut self, key: KeyEvent, action: KeyAction) {
        self.bindings.insert(key, action);
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let key = |code, modifiers| KeyEvent::new(code, modifiers);
        let plain = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        let ctrl = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
        let shift = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT);

        let mut bindings = HashMap::new();

        // Vim-style scrolling
        bindings.insert(plain('j'), KeyAction::ScrollDown);
        bindings.insert(plain('k'), KeyAction::ScrollUp);
        bindings.insert(plain('h'), KeyAction::ScrollLeft);
        bindings.insert(plain('l'), KeyAction::ScrollRight);
        bindings.insert(plain('g'), KeyAction::ScrollToTop);
        bindings.insert(shift('G'), KeyAction::ScrollToBottom);

        // Arrow and paging keys
        bindings.insert(key(KeyCode::Up, KeyModifiers::NONE), KeyAction::ScrollUp);
        bindings.insert(key(KeyCode::Down, KeyModifiers::NONE), KeyAction::ScrollDown);
        bindings.insert(key(KeyCode::Left, KeyModifiers::NONE), KeyAction::ScrollLeft);
        bindings.insert(key(KeyCode::Right, KeyModifiers::NONE), KeyAction::ScrollRight);
        bindings.insert(key(KeyCode::Home, KeyModifiers::NONE), KeyAction::ScrollToTop);
        bindings.insert(key(KeyCode::End, KeyModifiers::NONE), KeyAction::ScrollToBottom);
        bindings.insert(key(KeyCode::PageUp, KeyModifiers::NONE), KeyAction::PageUp);
        bindings.insert(key(KeyCode::PageDown, KeyModifiers::NONE), KeyAction::PageDown);
        bindings.insert(ctrl('u'), KeyAction::PageUp);
        bindings.insert(ctrl('d'), KeyAction::PageDown);

        // Panes
        bindings.insert(key(KeyCode::Tab, KeyModifiers::NONE), KeyAction::CycleFocus);
        bindings.insert(plain(']'), KeyAction::NextFile);
        bindings.insert(plain('['), KeyAction::PrevFile);

        // Find
        bindings.insert(plain('/'), KeyAction::StartFind);
        bindings.insert(ctrl('f'), KeyAction::StartFind);
        bindings.insert(plain('*'), KeyAction::FindSelection);
        bindings.insert(shift('*'), KeyAction::FindSelection);
        bindings.insert(plain('n'), KeyAction::NextMatch);
        bindings.insert(shift('N'), KeyAction::PrevMatch);
        bindings.insert(key(KeyCode::Esc, KeyModifiers::NONE), KeyAction::CancelFind);

        // Selection and display
        bindings.insert(ctrl('a'), KeyAction::SelectAll);
        bindings.insert(plain('w'), KeyAction::CycleWhitespace);
        bindings.insert(shift('W'), KeyAction::ToggleShowWhitespace);

        // Application
        bindings.insert(plain('q'), KeyAction::Quit);
        bindings.insert(ctrl('c'), KeyAction::Quit);

        Self { bindings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    #[test]
    fn default_bindings_map_vim_keys() {
        let bindings = KeyBindings::default();

        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE)),
            Some(KeyAction::ScrollDown)
        );
        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('N'), KeyModifiers::SHIFT)),
            Some(KeyAction::PrevMatch)
        );
    }

    #[test]
    fn lowercase_w_cycles_whitespace_and_uppercase_toggles_markers() {
        let bindings = KeyBindings::default();

        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE)),
            Some(KeyAction::CycleWhitespace)
        );
        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::Char('W'), KeyModifiers::SHIFT)),
            Some(KeyAction::ToggleShowWhitespace)
        );
    }

    #[test]
    fn event_kind_does_not_affect_lookup() {
        let bindings = KeyBindings::default();
        let repeat = KeyEvent::new_with_kind(
            KeyCode::Char('n'),
            KeyModifiers::NONE,
            KeyEventKind::Repeat,
        );

        assert_eq!(bindings.get(repeat), Some(KeyAction::NextMatch));
    }

    #[test]
    fn bind_overrides_default() {
        let mut bindings = KeyBindings::default();
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);

        bindings.bind(q, KeyAction::CancelFind);

        assert_eq!(bindings.get(q), Some(KeyAction::CancelFind));
    }

    #[test]
    fn unbound_key_is_none() {
        let bindings = KeyBindings::default();

        assert_eq!(
            bindings.get(KeyEvent::new(KeyCode::F(7), KeyModifiers::NONE)),
            None
        );
    }
}

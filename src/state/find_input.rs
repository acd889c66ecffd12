//! Find bar input state machine (pure).
//!
//! - `Inactive`: the bar is closed
//! - `Typing`: the user is editing the query; every edit re-schedules a search
//! - `Active`: the query was submitted and n/N navigate its matches
//!
//! Cursor positions are char indices into the query.

use crate::search::FindFlags;

/// Find bar state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FindInput {
    /// No find bar.
    #[default]
    Inactive,
    /// Query being edited.
    Typing {
        /// Query text.
        query: String,
        /// Insertion point, in chars.
        cursor: usize,
        /// Search options.
        flags: FindFlags,
    },
    /// Query submitted.
    Active {
        /// Query text.
        query: String,
        /// Search options.
        flags: FindFlags,
    },
}

/// Search option toggled from the find bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindOption {
    /// Case sensitivity. Alt+c
    CaseSensitive,
    /// Whole words only. Alt+w
    WholeWord,
    /// Regular expression. Alt+r
    Regex,
}

impl FindInput {
    /// Query of a typing or active bar.
    pub fn query(&self) -> Option<&str> {
        match self {
            FindInput::Inactive => None,
            FindInput::Typing { query, .. } | FindInput::Active { query, .. } => Some(query),
        }
    }

    /// Options of a typing or active bar.
    pub fn flags(&self) -> Option<FindFlags> {
        match self {
            FindInput::Inactive => None,
            FindInput::Typing { flags, .. } | FindInput::Active { flags, .. } => Some(*flags),
        }
    }

    /// `true` while the query is being edited.
    pub fn is_typing(&self) -> bool {
        matches!(self, FindInput::Typing { .. })
    }
}

/// Open the bar with `prefill`, keeping the options of an open bar.
pub fn handle_open(state: FindInput, prefill: Option<String>) -> FindInput {
    let flags = state.flags().unwrap_or_default();
    let query = match (prefill, state) {
        (Some(text), _) => text,
        (None, FindInput::Typing { query, .. } | FindInput::Active { query, .. }) => query,
        (None, FindInput::Inactive) => String::new(),
    };
    let cursor = query.chars().count();
    FindInput::Typing {
        query,
        cursor,
        flags,
    }
}

/// Insert `ch` at the cursor.
pub fn handle_char_input(state: FindInput, ch: char) -> FindInput {
    match state {
        FindInput::Typing {
            mut query,
            cursor,
            flags,
        } => {
            query.insert(byte_offset(&query, cursor), ch);
            FindInput::Typing {
                query,
                cursor: cursor + 1,
                flags,
            }
        }
        other => other,
    }
}

/// Delete the char before the cursor.
pub fn handle_backspace(state: FindInput) -> FindInput {
    match state {
        FindInput::Typing {
            mut query,
            cursor,
            flags,
        } if cursor > 0 => {
            query.remove(byte_offset(&query, cursor - 1));
            FindInput::Typing {
                query,
                cursor: cursor - 1,
                flags,
            }
        }
        other => other,
    }
}

/// Move the cursor one char left, saturating at 0.
pub fn handle_cursor_left(state: FindInput) -> FindInput {
    match state {
        FindInput::Typing {
            query,
            cursor,
            flags,
        } => FindInput::Typing {
            query,
            cursor: cursor.saturating_sub(1),
            flags,
        },
        other => other,
    }
}

/// Move the cursor one char right, saturating at the end.
pub fn handle_cursor_right(state: FindInput) -> FindInput {
    match state {
        FindInput::Typing {
            query,
            cursor,
            flags,
        } => {
            let max = query.chars().count();
            FindInput::Typing {
                query,
                cursor: (cursor + 1).min(max),
                flags,
            }
        }
        other => other,
    }
}

/// Flip one search option.
pub fn handle_toggle_option(state: FindInput, option: FindOption) -> FindInput {
    let toggle = |mut flags: FindFlags| {
        match option {
            FindOption::CaseSensitive => flags.case_sensitive = !flags.case_sensitive,
            FindOption::WholeWord => flags.whole_word = !flags.whole_word,
            FindOption::Regex => flags.use_regex = !flags.use_regex,
        }
        flags
    };
    match state {
        FindInput::Typing {
            query,
            cursor,
            flags,
        } => FindInput::Typing {
            query,
            cursor,
            flags: toggle(flags),
        },
        FindInput::Active { query, flags } => FindInput::Active {
            query,
            flags: toggle(flags),
        },
        FindInput::Inactive => FindInput::Inactive,
    }
}

/// Finish editing. An empty query closes the bar.
pub fn handle_submit(state: FindInput) -> FindInput {
    match state {
        FindInput::Typing { query, flags, .. } if !query.is_empty() => {
            FindInput::Active { query, flags }
        }
        FindInput::Typing { .. } => FindInput::Inactive,
        other => other,
    }
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(offset, _)| offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typing(query: &str, cursor: usize) -> FindInput {
        FindInput::Typing {
            query: query.to_string(),
            cursor,
            flags: FindFlags::default(),
        }
    }

    #[test]
    fn open_empty_bar() {
        assert_eq!(handle_open(FindInput::Inactive, None), typing("", 0));
    }

    #[test]
    fn open_with_prefill_puts_cursor_at_end() {
        let state = handle_open(FindInput::Inactive, Some("néw".to_string()));

        assert_eq!(state, typing("néw", 3));
    }

    #[test]
    fn reopening_keeps_previous_query_and_flags() {
        let flags = FindFlags {
            use_regex: true,
            ..FindFlags::default()
        };
        let active = FindInput::Active {
            query: "foo".into(),
            flags,
        };

        let state = handle_open(active, None);

        assert_eq!(state.query(), Some("foo"));
        assert_eq!(state.flags(), Some(flags));
    }

    #[test]
    fn insert_in_middle_of_multibyte_query() {
        let state = handle_char_input(typing("中文", 1), 'x');

        assert_eq!(state, typing("中x文", 2));
    }

    #[test]
    fn backspace_removes_previous_char() {
        assert_eq!(handle_backspace(typing("中文", 2)), typing("中", 1));
        assert_eq!(handle_backspace(typing("ab", 0)), typing("ab", 0));
    }

    #[test]
    fn cursor_moves_saturate() {
        assert_eq!(handle_cursor_left(typing("ab", 0)), typing("ab", 0));
        assert_eq!(handle_cursor_right(typing("ab", 2)), typing("ab", 2));
        assert_eq!(handle_cursor_right(typing("ab", 1)), typing("ab", 2));
    }

    #[test]
    fn toggle_options() {
        let state = handle_toggle_option(typing("x", 1), FindOption::WholeWord);
        let state = handle_toggle_option(state, FindOption::CaseSensitive);

        assert_eq!(
            state.flags(),
            Some(FindFlags {
                case_sensitive: true,
                whole_word: true,
                use_regex: false
            })
        );
    }

    #[test]
    fn submit_activates_or_closes() {
        assert_eq!(
            handle_submit(typing("x", 1)),
            FindInput::Active {
                query: "x".into(),
                flags: FindFlags::default()
            }
        );
        assert_eq!(handle_submit(typing("", 0)), FindInput::Inactive);
    }

    #[test]
    fn edits_are_ignored_outside_typing() {
        assert_eq!(handle_char_input(FindInput::Inactive, 'a'), FindInput::Inactive);
        assert_eq!(handle_backspace(FindInput::Inactive), FindInput::Inactive);
    }
}

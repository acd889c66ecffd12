//! Configuration module.
//!
//! [`loader`] resolves the on-disk TOML file, environment variables and CLI
//! flags into a [`ResolvedConfig`]. The subset that affects how text is laid
//! out is handed to the view layer as a [`RenderConfig`] value.

pub mod keybindings;
pub mod loader;

pub use keybindings::KeyBindings;
pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    IgnoreWhitespace, ResolvedConfig,
};

use crate::encoding;
use encoding_rs::Encoding;

/// Settings consulted while measuring and painting lines.
///
/// Passed explicitly into the line store and cursor; a settings change is
/// applied with `update_config` instead of being looked up at paint time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Columns per tab stop (always ≥ 1).
    pub tab_width: usize,
    /// Draw `·` for spaces and `→` for tabs.
    pub show_whitespace: bool,
    /// Encoding tried first when decoding diff content.
    pub preferred_encoding: &'static Encoding,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            show_whitespace: false,
            preferred_encoding: encoding_rs::UTF_8,
        }
    }
}

impl RenderConfig {
    /// Derive from a resolved config; unknown encoding labels fall back to UTF-8.
    pub fn from_resolved(config: &ResolvedConfig) -> Self {
        let preferred_encoding = encoding::encoding_for_label(&config.diff_encoding)
            .unwrap_or_else(|| {
                tracing::warn!(label = %config.diff_encoding, "Unknown diff encoding, using utf-8");
                encoding_rs::UTF_8
            });
        Self {
            tab_width: config.tab_width.max(1),
            show_whitespace: config.show_whitespace,
            preferred_encoding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_config_takes_resolved_values() {
        let resolved = ResolvedConfig {
            tab_width: 8,
            show_whitespace: true,
            diff_encoding: "gbk".to_string(),
            ..ResolvedConfig::default()
        };

        let render = RenderConfig::from_resolved(&resolved);

        assert_eq!(render.tab_width, 8);
        assert!(render.show_whitespace);
        // encoding_rs maps the gbk label onto GBK
        assert_eq!(render.preferred_encoding.name(), "GBK");
    }

    #[test]
    fn unknown_encoding_label_falls_back_to_utf8() {
        let resolved = ResolvedConfig {
            diff_encoding: "klingon".to_string(),
            ..ResolvedConfig::default()
        };

        assert_eq!(
            RenderConfig::from_resolved(&resolved).preferred_encoding,
            encoding_rs::UTF_8
        );
    }
}

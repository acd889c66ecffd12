//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// Whitespace handling passed to the diff command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IgnoreWhitespace {
    /// Show every whitespace change.
    #[default]
    None,
    /// `--ignore-space-at-eol`
    Eol,
    /// `--ignore-space-change`
    Change,
}

impl IgnoreWhitespace {
    /// Extra diff option for this mode, if any.
    pub fn diff_arg(self) -> Option<&'static str> {
        match self {
            IgnoreWhitespace::None => None,
            IgnoreWhitespace::Eol => Some("--ignore-space-at-eol"),
            IgnoreWhitespace::Change => Some("--ignore-space-change"),
        }
    }

    /// Next mode in the cycle `None → Eol → Change → None`.
    pub fn cycle(self) -> Self {
        match self {
            IgnoreWhitespace::None => IgnoreWhitespace::Eol,
            IgnoreWhitespace::Eol => IgnoreWhitespace::Change,
            IgnoreWhitespace::Change => IgnoreWhitespace::None,
        }
    }
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/difflens/config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Columns per tab stop.
    #[serde(default)]
    pub tab_width: Option<usize>,

    /// Draw visible markers for tabs and spaces.
    #[serde(default)]
    pub show_whitespace: Option<bool>,

    /// Preferred encoding label for diff content (e.g. "utf-8", "gbk").
    #[serde(default)]
    pub diff_encoding: Option<String>,

    /// Context lines around each change.
    #[serde(default)]
    pub context_lines: Option<u32>,

    /// Whitespace handling for diffs.
    #[serde(default)]
    pub ignore_whitespace: Option<IgnoreWhitespace>,

    /// Delay between the last keystroke and the search, in milliseconds.
    #[serde(default)]
    pub find_debounce_ms: Option<u64>,

    /// Maximum interval between clicks of a double or triple click.
    #[serde(default)]
    pub double_click_ms: Option<u64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Columns per tab stop.
    pub tab_width: usize,
    /// Visible whitespace markers.
    pub show_whitespace: bool,
    /// Preferred encoding label for diff content.
    pub diff_encoding: String,
    /// Context lines around each change.
    pub context_lines: u32,
    /// Whitespace handling for diffs.
    pub ignore_whitespace: IgnoreWhitespace,
    /// Find debounce in milliseconds.
    pub find_debounce_ms: u64,
    /// Multi-click interval in milliseconds.
    pub double_click_ms: u64,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            show_whitespace: false,
            diff_encoding: "utf-8".to_string(),
            context_lines: 3,
            ignore_whitespace: IgnoreWhitespace::None,
            find_debounce_ms: 200,
            double_click_ms: 400,
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/difflens/difflens.log` on Unix-like systems, or
/// `difflens.log` in the current directory when no state dir is known.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("difflens").join("difflens.log")
    } else {
        PathBuf::from("difflens.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path (`~/.config/difflens/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("difflens").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `DIFFLENS_CONFIG` environment variable
/// 3. Default path `~/.config/difflens/config.toml`
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("DIFFLENS_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        tab_width: config
            .tab_width
            .filter(|w| *w > 0)
            .unwrap_or(defaults.tab_width),
        show_whitespace: config.show_whitespace.unwrap_or(defaults.show_whitespace),
        diff_encoding: config.diff_encoding.unwrap_or(defaults.diff_encoding),
        context_lines: config.context_lines.unwrap_or(defaults.context_lines),
        ignore_whitespace: config
            .ignore_whitespace
            .unwrap_or(defaults.ignore_whitespace),
        find_debounce_ms: config.find_debounce_ms.unwrap_or(defaults.find_debounce_ms),
        double_click_ms: config.double_click_ms.unwrap_or(defaults.double_click_ms),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides.
///
/// - `DIFFLENS_ENCODING`: preferred diff encoding
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(encoding) = std::env::var("DIFFLENS_ENCODING") {
        config.diff_encoding = encoding;
    }

    config
}

/// Apply CLI argument overrides (highest precedence).
///
/// Only flags the user actually set are passed as `Some`.
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    ignore_whitespace_override: Option<IgnoreWhitespace>,
    encoding_override: Option<String>,
) -> ResolvedConfig {
    if let Some(mode) = ignore_whitespace_override {
        config.ignore_whitespace = mode;
    }

    if let Some(encoding) = encoding_override {
        config.diff_encoding = encoding;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

//! difflens - Entry Point

use clap::Parser;
use difflens::config::IgnoreWhitespace;
use difflens::source::{DiffTarget, GitRunner};
use difflens::state::{AppState, HighlightField, LaunchOptions};
use regex::Regex;
use std::path::PathBuf;
use tracing::info;

/// difflens - browse commits and their diffs in the terminal
#[derive(Parser, Debug)]
#[command(name = "difflens")]
#[command(version)]
#[command(about = "Terminal viewer for repository history and diffs")]
pub struct Args {
    /// Revision to list history from (defaults to HEAD)
    pub revision: Option<String>,

    /// Start with the staged changes
    #[arg(long, conflicts_with = "working_tree")]
    pub cached: bool,

    /// Start with the unstaged changes
    #[arg(long)]
    pub working_tree: bool,

    /// Whitespace handling for diffs
    #[arg(long, value_parser = ["none", "eol", "change"])]
    pub ignore_whitespace: Option<String>,

    /// Encoding tried first for diff content
    #[arg(long)]
    pub encoding: Option<String>,

    /// Start with this find query
    #[arg(long)]
    pub find: Option<String>,

    /// Highlight matches of this regex in every diff
    #[arg(long, value_parser = parse_pattern)]
    pub highlight: Option<String>,

    /// Lines --highlight applies to
    #[arg(long, value_parser = ["comments", "changes", "all"], requires = "highlight")]
    pub highlight_field: Option<String>,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Restrict history and diffs to these paths
    #[arg(last = true)]
    pub paths: Vec<String>,
}

fn parse_pattern(pattern: &str) -> Result<String, String> {
    Regex::new(pattern)
        .map(|_| pattern.to_string())
        .map_err(|e| e.to_string())
}

impl Args {
    fn highlight_field(&self) -> HighlightField {
        match self.highlight_field.as_deref() {
            Some("comments") => HighlightField::Comments,
            Some("changes") => HighlightField::Changes,
            _ => HighlightField::All,
        }
    }

    fn ignore_whitespace_override(&self) -> Option<IgnoreWhitespace> {
        match self.ignore_whitespace.as_deref()? {
            "eol" => Some(IgnoreWhitespace::Eol),
            "change" => Some(IgnoreWhitespace::Change),
            _ => Some(IgnoreWhitespace::None),
        }
    }

    fn launch_options(&self) -> LaunchOptions {
        let local_changes = if self.cached {
            Some(DiffTarget::Index)
        } else if self.working_tree {
            Some(DiffTarget::WorkingTree)
        } else {
            None
        };
        LaunchOptions {
            revision: self.revision.clone(),
            paths: self.paths.clone(),
            local_changes,
            find: self.find.clone(),
            highlight: self.highlight.clone(),
            highlight_field: self.highlight_field(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = difflens::config::load_config_with_precedence(args.config.clone())?;
        let merged = difflens::config::merge_config(config_file);
        let with_env = difflens::config::apply_env_overrides(merged);
        difflens::config::apply_cli_overrides(
            with_env,
            args.ignore_whitespace_override(),
            args.encoding.clone(),
        )
    };

    difflens::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let render = difflens::config::RenderConfig::from_resolved(&config);
    let state = AppState::new(
        Box::new(GitRunner::new()),
        config,
        render,
        args.launch_options(),
    );

    difflens::view::run(state)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_does_not_error() {
        let err = Args::try_parse_from(["difflens", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn no_args_defaults() {
        let args = Args::parse_from(["difflens"]);
        assert_eq!(args.revision, None);
        assert!(!args.cached);
        assert!(!args.working_tree);
        assert_eq!(args.ignore_whitespace_override(), None);
        assert!(args.paths.is_empty());
        assert_eq!(args.launch_options(), LaunchOptions::default());
    }

    #[test]
    fn revision_and_paths() {
        let args = Args::parse_from(["difflens", "main~2", "--", "src", "docs/a.md"]);

        let launch = args.launch_options();
        assert_eq!(launch.revision.as_deref(), Some("main~2"));
        assert_eq!(launch.paths, vec!["src", "docs/a.md"]);
    }

    #[test]
    fn cached_starts_with_the_index() {
        let args = Args::parse_from(["difflens", "--cached"]);
        assert_eq!(args.launch_options().local_changes, Some(DiffTarget::Index));
    }

    #[test]
    fn working_tree_starts_with_unstaged_changes() {
        let args = Args::parse_from(["difflens", "--working-tree"]);
        assert_eq!(
            args.launch_options().local_changes,
            Some(DiffTarget::WorkingTree)
        );
    }

    #[test]
    fn cached_conflicts_with_working_tree() {
        let err = Args::try_parse_from(["difflens", "--cached", "--working-tree"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn ignore_whitespace_values() {
        let args = Args::parse_from(["difflens", "--ignore-whitespace", "change"]);
        assert_eq!(args.ignore_whitespace_override(), Some(IgnoreWhitespace::Change));

        let err =
            Args::try_parse_from(["difflens", "--ignore-whitespace", "all"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn highlight_flows_into_launch() {
        let args = Args::parse_from([
            "difflens",
            "--highlight",
            "TODO|FIXME",
            "--highlight-field",
            "changes",
        ]);

        let launch = args.launch_options();
        assert_eq!(launch.highlight.as_deref(), Some("TODO|FIXME"));
        assert_eq!(launch.highlight_field, HighlightField::Changes);
    }

    #[test]
    fn invalid_highlight_pattern_is_rejected() {
        let err = Args::try_parse_from(["difflens", "--highlight", "(unclosed"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let err = Args::try_parse_from(["difflens", "--highlight-field", "all"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn find_and_encoding_flow_into_config_and_launch() {
        use difflens::config::{apply_cli_overrides, ResolvedConfig};

        let args = Args::parse_from(["difflens", "--find", "todo", "--encoding", "gbk"]);
        let config = apply_cli_overrides(
            ResolvedConfig::default(),
            args.ignore_whitespace_override(),
            args.encoding.clone(),
        );

        assert_eq!(config.diff_encoding, "gbk");
        assert_eq!(args.launch_options().find.as_deref(), Some("todo"));
    }
}

use crate::runner::{CommandTemplate, parse_env_pair};
use clap::Parser;
use std::path::{Component, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// Include patterns used when no `--match` is given.
pub const DEFAULT_MATCH: &[&str] = &["**/*.spec.*", "**/*.test.*"];

/// testpick – pick test files from a tree and run them
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to search for test files
    #[arg(value_name = "DIR", default_value = "tests")]
    pub root: PathBuf,

    /// Include pattern (glob, regex, or `re:`/`glob:` prefixed). Repeatable.
    /// Matched against paths relative to DIR. Defaults to **/*.spec.* and **/*.test.*
    #[arg(long = "match", value_name = "PATTERN")]
    pub matches: Vec<String>,

    /// Exclude pattern, same syntax as --match. Repeatable.
    #[arg(long = "ignore", value_name = "PATTERN")]
    pub ignores: Vec<String>,

    /// Include files ignored by .gitignore
    #[arg(long)]
    pub include_ignored: bool,

    /// Leading path segment hidden in the tree (defaults to DIR when it is a single directory name)
    #[arg(long, value_name = "NAME")]
    pub strip_root: Option<String>,

    /// Pattern for files that start out selected, matched against the listed paths. Repeatable.
    #[arg(long, value_name = "PATTERN")]
    pub preselect: Vec<String>,

    /// Environment variable for the test command. Repeatable.
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair, default_values = ["DEBUG=1"])]
    pub env: Vec<(String, String)>,

    /// Print the command instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Rows moved by Shift+Up/Down
    #[arg(long, value_name = "ROWS", default_value_t = 10)]
    pub scroll_rows: usize,

    /// Delay between smooth-scroll steps in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 25)]
    pub scroll_tick_ms: u64,

    /// Write logs to this file (the terminal is busy with the picker)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log verbosity: off, error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LevelFilter,

    /// Test command; `{}` is replaced by the picked paths, otherwise they are appended.
    /// Defaults to `npx playwright test {} --project=debug --ui`
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl Cli {
    pub fn include_patterns(&self) -> Vec<String> {
        if self.matches.is_empty() {
            DEFAULT_MATCH.iter().map(|s| s.to_string()).collect()
        } else {
            self.matches.clone()
        }
    }

    pub fn command_template(&self) -> CommandTemplate {
        CommandTemplate::from_words(&self.command).unwrap_or_default()
    }

    /// Segment to strip from the front of every path in the tree.
    pub fn strip_segment(&self) -> Option<String> {
        if let Some(name) = &self.strip_root {
            return Some(name.clone());
        }
        let mut parts = self
            .root
            .components()
            .filter(|c| !matches!(c, Component::CurDir));
        match (parts.next(), parts.next()) {
            (Some(Component::Normal(name)), None) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        }
    }
}

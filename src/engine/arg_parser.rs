use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// When to color output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Only when stdout is an interactive terminal.
    #[default]
    Auto,
    Always,
    Never,
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_positive_secs(s: &str) -> Result<u64, String> {
    parse_positive(s).map(|n| n as u64)
}

/// Check subfolders of one or more directories for Git status.
#[derive(Clone, Debug, Parser)]
#[command(name = "repo-check")]
#[command(
    about = "Check subfolders for Git status (branch, clean/dirty, remote, ahead/behind)."
)]
pub struct Cli {
    /// Directory to scan (repeatable). Default: configured paths, else current directory.
    #[arg(long, short = 'p', value_name = "DIR")]
    pub path: Vec<PathBuf>,

    /// Exclude hidden subfolders (names starting with a dot).
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub exclude_hidden: Option<bool>,

    /// Maximum parallel Git checks. Default: available CPUs.
    #[arg(long, short = 'j', value_parser = parse_positive)]
    pub max_workers: Option<usize>,

    /// Folder levels below each root to list (1 = immediate subfolders).
    #[arg(long, short = 'd', value_parser = parse_positive)]
    pub depth: Option<usize>,

    /// Timeout for each git invocation, in seconds.
    #[arg(long, value_name = "SECS", value_parser = parse_positive_secs)]
    pub timeout: Option<u64>,

    /// Count untracked files as dirty.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub include_untracked: Option<bool>,

    /// Remote to report on.
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,

    /// Run `git fetch` for each upstream before computing ahead/behind.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub fetch: Option<bool>,

    /// List folders inside repositories when --depth is greater than 1 (default: true).
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub descend_into_repos: Option<bool>,

    /// Settings file. Default: ~/.config/repo-check/config.toml
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Ignore list file. Default: ~/.config/repo-check/ignore
    #[arg(long, value_name = "FILE")]
    pub ignore_file: Option<PathBuf>,

    /// Print final results as JSON.
    #[arg(long)]
    pub json: bool,

    /// Color output.
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

//! CLI run handler: resolve options, check git, discover, scan, render.

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::io::IsTerminal;
use std::sync::Arc;

use crate::engine::arg_parser::{Cli, ColorChoice};
use crate::engine::progress::{render_final, render_live};
use crate::engine::tools::{check_roots_are_dirs, normalize_roots};
use crate::pipeline::{count_pending, discover, report_row_errors, scan};
use crate::probe::{GitProbe, ensure_git_available};
use crate::report::{Renderer, render_json};
use crate::utils::config::PackagePaths;
use crate::utils::{
    SettingsFile, apply_file_to_opts, ensure_settings_file, load_ignore_entries,
    load_settings_file, setup_logging,
};
use crate::{Cancel, Opts, ScanOpts};

/// Explicit `--config` is read as-is; the default location is created on first run.
fn load_settings(cli: &Cli) -> Option<SettingsFile> {
    if let Some(path) = &cli.config {
        if !path.exists() {
            warn!("Settings file not found: {}", path.display());
        }
        return load_settings_file(path);
    }
    let paths = PackagePaths::get();
    let path = paths.settings_path()?;
    let legacy = paths.legacy_settings_path();
    match ensure_settings_file(&path, legacy.as_deref()) {
        Ok(true) => info!("Created settings file {}", path.display()),
        Ok(false) => {}
        Err(e) => warn!("{:#}", e),
    }
    load_settings_file(&path)
}

/// Overwrite opts field from the command line when given.
macro_rules! apply_cli_opt {
    ($cli:expr, $opts:expr, $cli_field:ident => $opts_field:ident) => {
        if let Some(v) = $cli.$cli_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Defaults, then settings file, then flags.
pub fn setup_opts(cli: &Cli, file: Option<&SettingsFile>) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = file {
        apply_file_to_opts(file, &mut opts);
    }
    if !cli.path.is_empty() {
        opts.roots = cli.path.clone();
    }
    apply_cli_opt!(cli, opts, exclude_hidden => exclude_hidden);
    if cli.max_workers.is_some() {
        opts.max_workers = cli.max_workers;
    }
    apply_cli_opt!(cli, opts, depth => depth);
    apply_cli_opt!(cli, opts, timeout => timeout_secs);
    apply_cli_opt!(cli, opts, include_untracked => include_untracked);
    apply_cli_opt!(cli, opts, remote => remote);
    apply_cli_opt!(cli, opts, fetch => fetch);
    apply_cli_opt!(cli, opts, descend_into_repos => descend_into_repos);
    opts.verbose = cli.verbose.unwrap_or(false);
    opts.json = cli.json;
    opts
}

fn use_color(choice: ColorChoice) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal(),
    }
}

/// Scan the configured roots and print one row per subfolder.
pub fn handle_run(cli: &Cli) -> Result<()> {
    setup_logging(cli.verbose.unwrap_or(false));
    let settings = load_settings(cli);
    let opts = setup_opts(cli, settings.as_ref());
    debug!(
        "{} CONFIG:{:#?}",
        PackagePaths::get().pkg_name().to_uppercase(),
        opts
    );

    let probe_opts = opts.probe_opts();
    ensure_git_available(&probe_opts.git_bin)?;

    let cwd = std::env::current_dir().context("read current directory")?;
    let roots = normalize_roots(&opts.roots, &cwd);
    check_roots_are_dirs(&roots)?;

    let ignore = cli
        .ignore_file
        .clone()
        .or_else(|| PackagePaths::get().ignore_path())
        .map(|p| load_ignore_entries(&p))
        .unwrap_or_default();
    let candidates = discover(&roots, &opts.discover_opts(ignore));
    if candidates.is_empty() {
        info!("No subfolders found.");
        return Ok(());
    }

    let cancel = Cancel::new();
    let cancel_handler = cancel.clone();
    ctrlc::set_handler(move || {
        if !cancel_handler.is_cancelled() {
            warn!("Interrupted; stopping scan");
        }
        cancel_handler.cancel();
    })
    .context("set Ctrl+C handler")?;

    let probe = Arc::new(GitProbe::new(probe_opts, cancel.clone()));
    let handle = scan(
        candidates,
        probe,
        &ScanOpts {
            max_workers: opts.max_workers,
            cancel: cancel.clone(),
        },
    );

    let color = use_color(cli.color) && !opts.json;
    colored::control::set_override(color);
    let renderer = Renderer::new(color, opts.remote.as_str());
    let stdout = std::io::stdout();
    let interactive = stdout.is_terminal();
    let mut out = stdout.lock();

    let rows = if opts.json {
        let rows = handle.wait_all()?;
        println_json(&mut out, &render_json(&rows)?)?;
        rows
    } else if interactive {
        render_live(&renderer, &mut out, handle)?
    } else {
        render_final(&renderer, &mut out, handle)?
    };

    report_row_errors(&rows, opts.verbose);
    if cancel.is_cancelled() {
        bail!(
            "scan cancelled by user; {} folders left pending",
            count_pending(&rows)
        );
    }
    Ok(())
}

fn println_json<W: std::io::Write>(out: &mut W, json: &str) -> Result<()> {
    writeln!(out, "{}", json).context("write JSON")
}


//! Load and bootstrap the `config.toml` settings file (CLI only). Lib callers pass options directly.
//!
//! Entries are validated one by one: a bad key is logged and skipped and the rest of the file
//! still applies.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::utils::config::ProbeDefaults;

#[derive(Debug, Default, Serialize)]
pub struct SettingsFile {
    pub settings: SettingsSection,
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct SettingsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_untracked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descend_into_repos: Option<bool>,
}

fn field<T: DeserializeOwned>(origin: &Path, key: &str, value: toml::Value) -> Option<T> {
    value
        .try_into::<T>()
        .map_err(|e| warn!("{}: skipping `{}`: {}", origin.display(), key, e))
        .ok()
}

/// Like [`field`] but rejects zero.
fn positive<T: DeserializeOwned + PartialEq + Default>(
    origin: &Path,
    key: &str,
    value: toml::Value,
) -> Option<T> {
    let v: T = field(origin, key, value)?;
    if v == T::default() {
        warn!("{}: skipping `{}`: must be greater than 0", origin.display(), key);
        return None;
    }
    Some(v)
}

/// Parse settings text. `origin` is only used in log messages.
pub fn parse_settings(text: &str, origin: &Path) -> SettingsFile {
    let table: toml::Table = match toml::from_str(text) {
        Ok(t) => t,
        Err(e) => {
            warn!("{}: {}", origin.display(), e);
            return SettingsFile::default();
        }
    };
    let mut section = SettingsSection::default();
    let settings = match table.get("settings") {
        Some(toml::Value::Table(t)) => t.clone(),
        Some(_) => {
            warn!("{}: `settings` is not a table", origin.display());
            return SettingsFile::default();
        }
        None => return SettingsFile::default(),
    };
    for (key, value) in settings {
        match key.as_str() {
            "paths" => section.paths = field(origin, &key, value),
            "exclude_hidden" => section.exclude_hidden = field(origin, &key, value),
            "max_workers" => section.max_workers = positive(origin, &key, value),
            "depth" => section.depth = positive(origin, &key, value),
            "timeout_secs" => section.timeout_secs = positive(origin, &key, value),
            "include_untracked" => section.include_untracked = field(origin, &key, value),
            "remote" => {
                section.remote = field::<String>(origin, &key, value).filter(|r| !r.is_empty())
            }
            "fetch" => section.fetch = field(origin, &key, value),
            "descend_into_repos" => section.descend_into_repos = field(origin, &key, value),
            other => warn!("{}: unknown setting `{}`", origin.display(), other),
        }
    }
    SettingsFile { settings: section }
}

/// Load settings from `path`. Returns None if the file is missing or unreadable.
pub fn load_settings_file(path: &Path) -> Option<SettingsFile> {
    let s = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("{}: {}", path.display(), e);
            return None;
        }
    };
    debug!("Loaded settings from {}", path.display());
    Some(parse_settings(&s, path))
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file settings to opts (only fields present in the file). Call before applying CLI.
pub fn apply_file_to_opts(file: &SettingsFile, opts: &mut Opts) {
    let sec = &file.settings;
    if let Some(ref paths) = sec.paths {
        opts.roots = paths.iter().filter(|p| !p.is_empty()).map(PathBuf::from).collect();
    }
    apply_file_opt!(sec, opts, exclude_hidden => exclude_hidden);
    if let Some(n) = sec.max_workers {
        opts.max_workers = Some(n);
    }
    apply_file_opt!(sec, opts, depth => depth);
    apply_file_opt!(sec, opts, timeout_secs => timeout_secs);
    apply_file_opt!(sec, opts, include_untracked => include_untracked);
    apply_file_opt!(sec, opts, remote => remote);
    apply_file_opt!(sec, opts, fetch => fetch);
    apply_file_opt!(sec, opts, descend_into_repos => descend_into_repos);
}

/// `1/true/yes/on` and `0/false/no/off`, case-insensitive.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse the legacy flat format: `path=`, `exclude_hidden=`, `max_workers=` lines.
/// Comments, blank lines, lines without `=` and invalid values are skipped.
pub fn parse_legacy_settings(text: &str) -> SettingsSection {
    let mut section = SettingsSection::default();
    let mut paths = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "path" if !value.is_empty() => paths.push(value.to_string()),
            "exclude_hidden" => {
                if let Some(b) = parse_bool(value) {
                    section.exclude_hidden = Some(b);
                }
            }
            "max_workers" => {
                if let Ok(n) = value.parse::<usize>()
                    && n > 0
                {
                    section.max_workers = Some(n);
                }
            }
            _ => {}
        }
    }
    if !paths.is_empty() {
        section.paths = Some(paths);
    }
    section
}

/// Section written on first run: every host-independent default spelled out.
fn default_section() -> SettingsSection {
    SettingsSection {
        paths: None,
        exclude_hidden: Some(false),
        max_workers: None,
        depth: Some(1),
        timeout_secs: Some(ProbeDefaults::TIMEOUT_SECS),
        include_untracked: Some(true),
        remote: Some(ProbeDefaults::REMOTE.to_string()),
        fetch: Some(false),
        descend_into_repos: Some(true),
    }
}

const SETTINGS_HEADER: &str = "\
# repo-check settings. Command-line flags override these values.
# paths = [\"~/code\"]   # scan roots (default: current directory)
# max_workers = 8       # parallel git probes (default: available CPUs)

";

/// Create `path` with defaults when it does not exist. Values from a legacy flat file are
/// imported when `legacy` exists. Returns true when a file was written.
pub fn ensure_settings_file(path: &Path, legacy: Option<&Path>) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    let mut section = default_section();
    if let Some(legacy) = legacy.filter(|p| p.is_file()) {
        let text = std::fs::read_to_string(legacy)
            .with_context(|| format!("read legacy settings {}", legacy.display()))?;
        let imported = parse_legacy_settings(&text);
        section.paths = imported.paths;
        section.exclude_hidden = imported.exclude_hidden.or(section.exclude_hidden);
        section.max_workers = imported.max_workers;
        info!("Imported legacy settings from {}", legacy.display());
    }
    let body = toml::to_string_pretty(&SettingsFile { settings: section })
        .context("serialize default settings")?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create settings directory {}", dir.display()))?;
    }
    std::fs::write(path, format!("{SETTINGS_HEADER}{body}"))
        .with_context(|| format!("write settings {}", path.display()))?;
    debug!("Wrote default settings to {}", path.display());
    Ok(true)
}

//! Application configuration constants.
//! Defaults, file locations and tuning in one place.

use std::path::PathBuf;
use std::sync::OnceLock;

use crate::engine::tools::home_dir;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived file names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    settings_filename: String,
    legacy_settings_filename: String,
    ignore_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| PackagePaths {
            pkg_name: env!("CARGO_PKG_NAME"),
            settings_filename: "config.toml".to_string(),
            legacy_settings_filename: "config".to_string(),
            ignore_filename: "ignore".to_string(),
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// `$XDG_CONFIG_HOME/<pkg>` or `~/.config/<pkg>`. None when no home directory is known.
    pub fn config_dir(&self) -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| home_dir().map(|h| h.join(".config")))?;
        Some(base.join(self.pkg_name))
    }

    pub fn settings_path(&self) -> Option<PathBuf> {
        self.config_dir().map(|d| d.join(&self.settings_filename))
    }

    /// Flat `key=value` settings file written by older releases.
    pub fn legacy_settings_path(&self) -> Option<PathBuf> {
        self.config_dir()
            .map(|d| d.join(&self.legacy_settings_filename))
    }

    pub fn ignore_path(&self) -> Option<PathBuf> {
        self.config_dir().map(|d| d.join(&self.ignore_filename))
    }
}

// ---- Probe ----

/// Defaults for the version-control probe.
pub struct ProbeDefaults;

impl ProbeDefaults {
    pub const GIT_BIN: &'static str = "git";
    pub const REMOTE: &'static str = "origin";
    /// Per git invocation. Generous because `--fetch` goes over the network.
    pub const TIMEOUT_SECS: u64 = 30;
    /// How often a waiting probe checks for exit, timeout and cancellation.
    pub const POLL_INTERVAL_MS: u64 = 10;
    /// After git exits, how long its output pipes may stay open (a forked helper such as an
    /// ssh master can inherit them).
    pub const OUTPUT_GRACE_MS: u64 = 2000;
}

// ---- Worker threads ----

/// Worker pool limits.
/// Use [`WorkerLimits::current()`] to fill `all_threads` from rayon; the rest are const.
#[derive(Clone, Copy, Debug)]
pub struct WorkerLimits {
    /// Available threads (from rayon); set by [`WorkerLimits::current()`].
    pub all_threads: usize,
    /// Lower bound for any pool.
    pub floor: usize,
}

impl Default for WorkerLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            floor: Self::FLOOR_THREADS,
        }
    }
}

impl WorkerLimits {
    pub const FLOOR_THREADS: usize = 1;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }
}

// ---- Rendering ----

/// Prefix drawn before nested rows (repeated indentation per extra level).
pub const NESTED_PREFIX: &str = "└─ ";
pub const NESTED_INDENT: &str = "   ";
/// Gap between table columns.
pub const COLUMN_GAP: &str = "  ";

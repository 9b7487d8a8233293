//! Path and filter utilities

use anyhow::{Result, bail};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// `$HOME` (or `%USERPROFILE%` on Windows).
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Expand a leading `~` or `~/` to the home directory. Other paths are returned as-is.
pub fn expand_home(path: &Path) -> PathBuf {
    let mut comps = path.components();
    if let Some(Component::Normal(first)) = comps.next()
        && first == OsStr::new("~")
        && let Some(home) = home_dir()
    {
        return home.join(comps.as_path());
    }
    path.to_path_buf()
}

/// Lexically normalize: drop `.` components and resolve `..` against the preceding component.
/// Does not touch the filesystem, so symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Expand `~`, make absolute against `base` and normalize.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let expanded = expand_home(path);
    if expanded.is_absolute() {
        normalize_path(&expanded)
    } else {
        normalize_path(&base.join(expanded))
    }
}

/// Absolutize every root against `cwd` and drop duplicates, keeping first occurrence.
/// Empty entries are skipped; an empty result falls back to `cwd`.
pub fn normalize_roots(roots: &[PathBuf], cwd: &Path) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut out: Vec<PathBuf> = roots
        .iter()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| absolutize(p, cwd))
        .filter(|p| seen.insert(p.clone()))
        .collect();
    if out.is_empty() {
        out.push(normalize_path(cwd));
    }
    out
}

/// Every root must be an existing directory.
pub fn check_roots_are_dirs(roots: &[PathBuf]) -> Result<()> {
    for root in roots {
        if !root.is_dir() {
            bail!("Not a directory: {}", root.display());
        }
    }
    Ok(())
}

/// True if the folder name starts with the hidden-file marker.
pub fn is_hidden_name(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Administrative metadata entry of a working tree (`.git` dir, or file for worktrees/submodules).
pub fn has_git_metadata(path: &Path) -> bool {
    path.join(".git").exists()
}

/// True if `path` lies strictly below another entry of `all`.
pub fn has_ancestor_in(path: &Path, all: &[PathBuf]) -> bool {
    all.iter().any(|other| other != path && path.starts_with(other))
}

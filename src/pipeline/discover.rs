//! Candidate discovery: list folders under each root to the configured depth, in a stable order.

use log::{debug, warn};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::engine::tools::{
    absolutize, has_ancestor_in, has_git_metadata, is_hidden_name, path_relative_to,
};
use crate::{Candidate, DiscoverOpts};

/// Resolve ignore entries against `base`: `~` expanded, relative entries joined to `base`.
pub fn resolve_ignore_paths(base: &Path, entries: &[String]) -> HashSet<PathBuf> {
    entries
        .iter()
        .map(|e| absolutize(Path::new(e), base))
        .collect()
}

/// Case-insensitive by name; ties broken by the raw name so the order is total.
pub fn compare_names(a: &OsStr, b: &OsStr) -> Ordering {
    let la = a.to_string_lossy().to_lowercase();
    let lb = b.to_string_lossy().to_lowercase();
    la.cmp(&lb).then_with(|| a.cmp(b))
}

/// Shared state for walking one top-level root.
struct WalkCtx<'a> {
    origin_root: &'a Path,
    all_roots: &'a [PathBuf],
    opts: &'a DiscoverOpts,
}

/// List folders below `base` (depth budget restarts here) and append them to `out`.
/// `level` is the nesting level of `base`'s immediate children.
fn walk_dir(ctx: &WalkCtx<'_>, base: &Path, level: usize, out: &mut Vec<Candidate>) {
    let ignored = resolve_ignore_paths(base, &ctx.opts.ignore);
    let mut it = WalkDir::new(base)
        .min_depth(1)
        .max_depth(ctx.opts.depth.max(1))
        .follow_links(false)
        .sort_by(|a, b| compare_names(a.file_name(), b.file_name()))
        .into_iter();

    while let Some(next) = it.next() {
        let entry = match next {
            Ok(entry) => entry,
            Err(err) => {
                let at = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| base.display().to_string());
                warn!("Skipping {}: {}", at, err);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        let name = entry.file_name();
        if name == ".git"
            || (ctx.opts.exclude_hidden && is_hidden_name(name))
            || ignored.contains(path)
        {
            it.skip_current_dir();
            continue;
        }

        let row_level = level + entry.depth() - 1;
        out.push(Candidate {
            path: path.to_path_buf(),
            root: ctx.origin_root.to_path_buf(),
            rel_path: path_relative_to(path, ctx.origin_root).unwrap_or_else(|| path.to_path_buf()),
            level: row_level,
        });

        if ctx.all_roots.iter().any(|r| r == path) {
            // Another supplied root: expand it here with its own depth budget and ignore base.
            it.skip_current_dir();
            let inner = path.to_path_buf();
            debug!("Expanding nested root {}", inner.display());
            walk_dir(ctx, &inner, row_level + 1, out);
        } else if !ctx.opts.descend_into_repos
            && entry.depth() < ctx.opts.depth
            && has_git_metadata(path)
        {
            it.skip_current_dir();
        }
    }
}

/// Ordered candidates for `roots`: roots in the order supplied, each walked depth-first with
/// children sorted by [`compare_names`]. Roots inside another root are expanded where the outer
/// walk reaches them instead of being walked on their own. Duplicate paths keep their first row.
pub fn discover(roots: &[PathBuf], opts: &DiscoverOpts) -> Vec<Candidate> {
    let top: Vec<&PathBuf> = roots
        .iter()
        .filter(|r| !has_ancestor_in(r, roots))
        .collect();

    let per_root: Vec<Vec<Candidate>> = top
        .par_iter()
        .map(|root| {
            let ctx = WalkCtx {
                origin_root: root.as_path(),
                all_roots: roots,
                opts,
            };
            let mut out = Vec::new();
            walk_dir(&ctx, root, 0, &mut out);
            out
        })
        .collect();

    let mut seen = HashSet::new();
    let candidates: Vec<Candidate> = per_root
        .into_iter()
        .flatten()
        .filter(|c| seen.insert(c.path.clone()))
        .collect();
    debug!(
        "Discovered {} candidates under {} roots",
        candidates.len(),
        top.len()
    );
    candidates
}

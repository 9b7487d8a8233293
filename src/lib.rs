//! repo-check: find Git working trees under one or more roots and report their status in parallel

pub mod engine;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use pipeline::{ScanHandle, discover, scan};
pub use probe::{GitProbe, Probe, ensure_git_available};

use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

/// Result alias used by public repo-check API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: check git is installed, discover candidates under `roots`, probe them all
/// with [`GitProbe`] and return the rows in discovery order.
///
/// `roots` are used as given (no `~` expansion or deduplication; see
/// [`normalize_roots`](crate::engine::tools::normalize_roots)). For progressive results use
/// [`discover`] and [`scan`] directly and read [`ScanHandle::updates`].
pub fn check_dirs(
    roots: &[PathBuf],
    discover_opts: &DiscoverOpts,
    probe_opts: &ProbeOpts,
    scan_opts: &ScanOpts,
) -> Result<Vec<ScanRow>> {
    ensure_git_available(&probe_opts.git_bin)?;
    let candidates = discover(roots, discover_opts);
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        probe_opts
    );
    let probe = Arc::new(GitProbe::new(probe_opts.clone(), scan_opts.cancel.clone()));
    scan(candidates, probe, scan_opts).wait_all()
}

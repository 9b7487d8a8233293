//! Public and internal types for the repo-check API and scan pipeline.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// A folder found by discovery, eligible for probing. Identity is the absolute `path`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Absolute path of the folder.
    pub path: PathBuf,
    /// Scan root the folder was discovered under.
    pub root: PathBuf,
    /// Path relative to `root` (used for display).
    pub rel_path: PathBuf,
    /// 0 for immediate children of the root, +1 per folder level below that
    /// (and per nested-root expansion).
    pub level: usize,
}

impl Candidate {
    /// True when the row is rendered beneath another row (deeper than the root's direct children).
    pub fn is_nested(&self) -> bool {
        self.level > 0
    }

    /// Folder name used in the name column.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.rel_path.display().to_string())
    }
}

/// Current checkout of a repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum BranchState {
    Named(String),
    Detached,
}

/// Remote configuration and divergence from the upstream branch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemoteState {
    NoRemote,
    /// The configured remote exists. `upstream: None` is the no-upstream state: counts are
    /// both zero but the branch does not track anything, which is not the same as in-sync.
    Remote {
        upstream: Option<String>,
        ahead: u64,
        behind: u64,
    },
}

impl RemoteState {
    /// True only when an upstream is configured and neither side has unique commits.
    pub fn is_in_sync(&self) -> bool {
        matches!(
            self,
            RemoteState::Remote {
                upstream: Some(_),
                ahead: 0,
                behind: 0
            }
        )
    }

    pub fn has_upstream(&self) -> bool {
        matches!(
            self,
            RemoteState::Remote {
                upstream: Some(_),
                ..
            }
        )
    }
}

/// Outcome of probing one candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeResult {
    NotRepository,
    Repository {
        branch: BranchState,
        dirty: bool,
        remote: RemoteState,
    },
    Error {
        message: String,
    },
}

impl ProbeResult {
    pub fn error(message: impl Into<String>) -> Self {
        ProbeResult::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ProbeResult::Error { .. })
    }
}

/// Lifecycle of a row: Pending until the worker that claimed it records a result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "result", rename_all = "snake_case")]
pub enum RowStatus {
    Pending,
    Done(ProbeResult),
}

/// One row of scan output, in discovery order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScanRow {
    pub candidate: Candidate,
    pub status: RowStatus,
}

impl ScanRow {
    pub fn result(&self) -> Option<&ProbeResult> {
        match &self.status {
            RowStatus::Pending => None,
            RowStatus::Done(r) => Some(r),
        }
    }
}

/// Completion notification sent by a worker: row `index` now holds `result`.
#[derive(Clone, Debug)]
pub struct RowUpdate {
    pub index: usize,
    pub result: ProbeResult,
}

/// Shared cancellation flag. Cloning shares the same flag.
#[derive(Clone, Debug, Default)]
pub struct Cancel(Arc<AtomicBool>);

impl Cancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Which working-tree changes make a repository dirty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirtyPolicy {
    /// Staged, unstaged and untracked changes.
    IncludeUntracked,
    /// Staged and unstaged changes to tracked files only.
    TrackedOnly,
}

impl DirtyPolicy {
    pub fn from_include_untracked(include_untracked: bool) -> Self {
        if include_untracked {
            DirtyPolicy::IncludeUntracked
        } else {
            DirtyPolicy::TrackedOnly
        }
    }
}

/// Options for the version-control probe.
#[derive(Clone, Debug)]
pub struct ProbeOpts {
    /// Program to run (normally `git`).
    pub git_bin: PathBuf,
    pub dirty_policy: DirtyPolicy,
    /// Remote whose presence is reported (normally `origin`).
    pub remote: String,
    /// Bound on each external process invocation.
    pub timeout: Duration,
    /// Refresh the upstream with `git fetch` before counting.
    pub fetch: bool,
}

impl ProbeOpts {
    pub fn new(dirty_policy: DirtyPolicy) -> Self {
        use crate::utils::config::ProbeDefaults;
        Self {
            git_bin: PathBuf::from(ProbeDefaults::GIT_BIN),
            dirty_policy,
            remote: ProbeDefaults::REMOTE.to_string(),
            timeout: Duration::from_secs(ProbeDefaults::TIMEOUT_SECS),
            fetch: false,
        }
    }
}

/// Options for candidate discovery.
#[derive(Clone, Debug)]
pub struct DiscoverOpts {
    /// Folder levels below each root that become candidates (1 = immediate children).
    pub depth: usize,
    pub exclude_hidden: bool,
    /// Ignore-list entries; relative entries resolve against the originating root.
    pub ignore: Vec<String>,
    /// List below folders that are repositories when `depth > 1`. False stops at them.
    pub descend_into_repos: bool,
}

impl Default for DiscoverOpts {
    fn default() -> Self {
        Self {
            depth: 1,
            exclude_hidden: false,
            ignore: Vec::new(),
            descend_into_repos: true,
        }
    }
}

/// Options for the scan scheduler.
#[derive(Clone, Debug, Default)]
pub struct ScanOpts {
    /// Upper bound on concurrently running probes. None = host parallelism.
    pub max_workers: Option<usize>,
    pub cancel: Cancel,
}

/// Fully resolved options for a CLI run (defaults → settings file → flags).
#[derive(Clone, Debug)]
pub struct Opts {
    pub roots: Vec<PathBuf>,
    pub exclude_hidden: bool,
    pub max_workers: Option<usize>,
    pub depth: usize,
    pub timeout_secs: u64,
    pub include_untracked: bool,
    pub remote: String,
    pub fetch: bool,
    pub descend_into_repos: bool,
    pub verbose: bool,
    pub json: bool,
}

impl Default for Opts {
    fn default() -> Self {
        use crate::utils::config::ProbeDefaults;
        Self {
            roots: Vec::new(),
            exclude_hidden: false,
            max_workers: None,
            depth: 1,
            timeout_secs: ProbeDefaults::TIMEOUT_SECS,
            include_untracked: true,
            remote: ProbeDefaults::REMOTE.to_string(),
            fetch: false,
            descend_into_repos: true,
            verbose: false,
            json: false,
        }
    }
}

impl Opts {
    pub fn probe_opts(&self) -> ProbeOpts {
        ProbeOpts {
            remote: self.remote.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            fetch: self.fetch,
            ..ProbeOpts::new(DirtyPolicy::from_include_untracked(self.include_untracked))
        }
    }

    pub fn discover_opts(&self, ignore: Vec<String>) -> DiscoverOpts {
        DiscoverOpts {
            depth: self.depth,
            exclude_hidden: self.exclude_hidden,
            ignore,
            descend_into_repos: self.descend_into_repos,
        }
    }
}

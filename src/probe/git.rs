//! Git-backed probe: root detection, branch, dirty state, remote and upstream divergence.

use anyhow::{Result, anyhow};
use log::debug;
use std::path::Path;

use crate::engine::tools::has_git_metadata;
use crate::{BranchState, Cancel, DirtyPolicy, ProbeOpts, ProbeResult, RemoteState};

use super::Probe;
use super::runner::{GitOutput, GitRunner, ProcessRunner};

/// Answers the four probe questions by running git in the candidate folder.
pub struct GitProbe<R = ProcessRunner> {
    runner: R,
    opts: ProbeOpts,
}

impl GitProbe<ProcessRunner> {
    /// Probe that spawns `opts.git_bin`; `cancel` kills in-flight invocations.
    pub fn new(opts: ProbeOpts, cancel: Cancel) -> Self {
        let runner = ProcessRunner::new(opts.git_bin.clone(), opts.timeout, cancel);
        Self { runner, opts }
    }
}

impl<R: GitRunner> GitProbe<R> {
    pub fn with_runner(runner: R, opts: ProbeOpts) -> Self {
        Self { runner, opts }
    }

    fn git(&self, path: &Path, args: &[&str]) -> Result<GitOutput> {
        self.runner.run(path, args)
    }

    fn inspect(&self, path: &Path) -> Result<ProbeResult> {
        if !has_git_metadata(path) {
            return Ok(ProbeResult::NotRepository);
        }
        let root = self.git(path, &["rev-parse", "--is-inside-work-tree"])?;
        if !root.success() || root.stdout != "true" {
            return Ok(ProbeResult::NotRepository);
        }
        let branch = self.branch(path)?;
        let dirty = self.dirty(path)?;
        let remote = self.remote(path)?;
        Ok(ProbeResult::Repository {
            branch,
            dirty,
            remote,
        })
    }

    fn branch(&self, path: &Path) -> Result<BranchState> {
        let args = ["symbolic-ref", "--quiet", "--short", "HEAD"];
        let out = self.git(path, &args)?;
        match out.code {
            Some(0) if !out.stdout.is_empty() => Ok(BranchState::Named(out.stdout)),
            // --quiet: status 1 without output means HEAD is not a symbolic ref
            Some(1) => Ok(BranchState::Detached),
            _ => Err(failed(&args, &out)),
        }
    }

    fn dirty(&self, path: &Path) -> Result<bool> {
        let mut args = vec!["status", "--porcelain"];
        if self.opts.dirty_policy == DirtyPolicy::TrackedOnly {
            args.push("--untracked-files=no");
        }
        let out = self.git(path, &args)?;
        if !out.success() {
            return Err(failed(&args, &out));
        }
        Ok(!out.stdout.is_empty())
    }

    fn remote(&self, path: &Path) -> Result<RemoteState> {
        let url = self.git(path, &["remote", "get-url", self.opts.remote.as_str()])?;
        if !url.success() || url.stdout.is_empty() {
            return Ok(RemoteState::NoRemote);
        }

        let upstream = self.git(
            path,
            &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"],
        )?;
        if !upstream.success() || upstream.stdout.is_empty() {
            return Ok(RemoteState::Remote {
                upstream: None,
                ahead: 0,
                behind: 0,
            });
        }

        if self.opts.fetch {
            let remote =
                upstream_remote_name(&upstream.stdout).unwrap_or(self.opts.remote.as_str());
            self.refresh(path, remote);
        }

        let args = ["rev-list", "--left-right", "--count", "HEAD...@{u}"];
        let counts = self.git(path, &args)?;
        if !counts.success() {
            return Err(failed(&args, &counts));
        }
        let (ahead, behind) = parse_left_right(&counts.stdout)
            .ok_or_else(|| anyhow!("unexpected rev-list output: {:?}", counts.stdout))?;
        Ok(RemoteState::Remote {
            upstream: Some(upstream.stdout),
            ahead,
            behind,
        })
    }

    /// Best effort: a failed fetch leaves the stale upstream in place.
    fn refresh(&self, path: &Path, remote: &str) {
        match self.git(path, &["fetch", "--quiet", "--prune", "--no-tags", remote]) {
            Ok(out) if out.success() => {}
            Ok(out) => debug!("fetch {} failed in {}: {}", remote, path.display(), out.stderr),
            Err(e) => debug!("fetch {} failed in {}: {:#}", remote, path.display(), e),
        }
    }
}

impl<R: GitRunner> Probe for GitProbe<R> {
    fn probe(&self, path: &Path) -> ProbeResult {
        match self.inspect(path) {
            Ok(result) => result,
            Err(e) => ProbeResult::error(format!("{e:#}")),
        }
    }
}

fn failed(args: &[&str], out: &GitOutput) -> anyhow::Error {
    let detail = if out.stderr.is_empty() {
        match out.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        }
    } else {
        out.stderr.clone()
    };
    anyhow!("git {} failed: {}", args.join(" "), detail)
}

/// Remote part of an upstream ref: `origin/main` → `origin`. None when there is no `/`.
pub fn upstream_remote_name(upstream: &str) -> Option<&str> {
    upstream
        .split_once('/')
        .map(|(remote, _)| remote)
        .filter(|r| !r.is_empty())
}

/// Parse `git rev-list --left-right --count HEAD...@{u}` output into `(ahead, behind)`.
pub fn parse_left_right(output: &str) -> Option<(u64, u64)> {
    let mut parts = output.split_whitespace();
    let ahead = parts.next()?.parse().ok()?;
    let behind = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((ahead, behind))
}

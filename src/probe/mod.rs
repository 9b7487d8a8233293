//! Version-control probe: one bounded status query per folder.
//!
//! [`Probe`] is the seam the scheduler calls through. [`GitProbe`] is the real implementation;
//! tests and library callers can plug in anything that maps a path to a [`ProbeResult`],
//! including plain closures.

use anyhow::{Context, Result, bail};
use log::debug;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::ProbeResult;

pub mod git;
pub mod runner;

pub use git::{GitProbe, parse_left_right, upstream_remote_name};
pub use runner::{GitOutput, GitRunner, ProcessRunner};

/// Determine the status of a single folder. Must not panic or block indefinitely;
/// every failure is reported as [`ProbeResult::Error`].
pub trait Probe: Send + Sync {
    fn probe(&self, path: &Path) -> ProbeResult;
}

impl<F> Probe for F
where
    F: Fn(&Path) -> ProbeResult + Send + Sync,
{
    fn probe(&self, path: &Path) -> ProbeResult {
        self(path)
    }
}

/// Run-level precondition: fail once, before scanning, when git cannot be executed at all.
/// Returns the `git --version` line.
pub fn ensure_git_available(git_bin: &Path) -> Result<String> {
    let out = Command::new(git_bin)
        .arg("--version")
        .stdin(Stdio::null())
        .output();
    match out {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            debug!("Using {}", version);
            Ok(version)
        }
        Ok(out) => bail!(
            "{} --version failed ({}). Please install Git and try again.",
            git_bin.display(),
            out.status
        ),
        Err(e) => Err(e).with_context(|| {
            format!(
                "{} is not available on PATH. Please install Git and try again.",
                git_bin.display()
            )
        }),
    }
}

//! Runs git as a child process with a deadline and a cancellation check.

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use log::debug;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::Cancel;
use crate::utils::config::ProbeDefaults;

/// Captured result of one git invocation. Output is lossy UTF-8 with surrounding whitespace trimmed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GitOutput {
    /// Exit code; None when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs `git -C <dir> <args>`. `Err` means the command could not produce an exit status
/// (spawn failure, timeout, cancellation); a non-zero exit is still `Ok`.
pub trait GitRunner: Send + Sync {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<GitOutput>;
}

/// Real runner: spawns the git binary.
pub struct ProcessRunner {
    git_bin: PathBuf,
    timeout: Duration,
    cancel: Cancel,
}

impl ProcessRunner {
    pub fn new(git_bin: PathBuf, timeout: Duration, cancel: Cancel) -> Self {
        Self {
            git_bin,
            timeout,
            cancel,
        }
    }
}

enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut,
    Cancelled,
}

/// Read `pipe` to the end on its own thread; the bytes arrive on the returned channel.
fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<Vec<u8>>> {
    pipe.map(|mut p| {
        let (tx, rx) = bounded(1);
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = p.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
        rx
    })
}

/// Output of one reader, waiting no later than `until`. `None` if the pipe is still open then.
fn collect(reader: Option<Receiver<Vec<u8>>>, until: Instant) -> Option<String> {
    let Some(rx) = reader else {
        return Some(String::new());
    };
    let wait = until.saturating_duration_since(Instant::now());
    match rx.recv_timeout(wait) {
        Ok(buf) => Some(String::from_utf8_lossy(&buf).trim().to_string()),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Poll until exit, deadline or cancellation. Kills the child on anything but a normal exit.
/// No deadline (`None`) when the timeout is too large to represent.
fn wait_with_deadline(
    child: &mut Child,
    deadline: Option<Instant>,
    cancel: &Cancel,
) -> Result<WaitOutcome> {
    let poll = Duration::from_millis(ProbeDefaults::POLL_INTERVAL_MS);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(WaitOutcome::Exited(status)),
            Ok(None) => {}
            Err(e) => {
                kill(child);
                return Err(e).context("wait for git");
            }
        }
        if cancel.is_cancelled() {
            kill(child);
            return Ok(WaitOutcome::Cancelled);
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            kill(child);
            return Ok(WaitOutcome::TimedOut);
        }
        thread::sleep(poll);
    }
}

impl GitRunner for ProcessRunner {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<GitOutput> {
        let deadline = Instant::now().checked_add(self.timeout);
        let mut child = Command::new(&self.git_bin)
            .arg("-C")
            .arg(dir)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_OPTIONAL_LOCKS", "0")
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn {}", self.git_bin.display()))?;
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        // Readers that miss their wait are left detached; a grandchild may hold the pipes open.
        match wait_with_deadline(&mut child, deadline, &self.cancel)? {
            WaitOutcome::Exited(status) => {
                let grace = Duration::from_millis(ProbeDefaults::OUTPUT_GRACE_MS);
                let until = Instant::now() + grace;
                let (Some(stdout), Some(stderr)) =
                    (collect(stdout, until), collect(stderr, until))
                else {
                    debug!("git {} left its output open in {}", args.join(" "), dir.display());
                    return Err(anyhow!(
                        "git {} exited but its output stayed open",
                        args.join(" ")
                    ));
                };
                Ok(GitOutput {
                    code: status.code(),
                    stdout,
                    stderr,
                })
            }
            WaitOutcome::TimedOut => {
                debug!("git {} timed out in {}", args.join(" "), dir.display());
                Err(anyhow!(
                    "git {} timed out after {}s",
                    args.join(" "),
                    self.timeout.as_secs_f64()
                ))
            }
            WaitOutcome::Cancelled => Err(anyhow!("git {} cancelled", args.join(" "))),
        }
    }
}

//! ProcessRunner against stand-in git executables. One test so the scripts are never written
//! while another test in this binary is spawning processes.
#![cfg(unix)]

use repo_check::Cancel;
use repo_check::probe::{GitRunner, ProcessRunner};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_process_runner() {
    let tmp = tempfile::tempdir().unwrap();
    let echo = script(tmp.path(), "echo-git", "echo \"$@\"\necho oops >&2\nexit 3");
    let slow = script(tmp.path(), "slow-git", "exec sleep 5");
    let leaky = script(tmp.path(), "leaky-git", "sleep 6 &\necho started\nexit 0");
    let work = tmp.path().join("work");
    fs::create_dir(&work).unwrap();

    // Arguments pass through after `-C <dir>`; a non-zero exit is still Ok.
    let runner = ProcessRunner::new(echo.clone(), Duration::from_secs(10), Cancel::new());
    let out = runner.run(&work, &["status", "--porcelain"]).unwrap();
    assert_eq!(out.code, Some(3));
    assert!(!out.success());
    assert_eq!(
        out.stdout,
        format!("-C {} status --porcelain", work.display())
    );
    assert_eq!(out.stderr, "oops");

    // Deadline kills the child.
    let runner = ProcessRunner::new(slow.clone(), Duration::from_millis(200), Cancel::new());
    let start = Instant::now();
    let err = runner.run(&work, &["fetch"]).unwrap_err();
    assert!(err.to_string().contains("timed out"), "{err}");
    assert!(start.elapsed() < Duration::from_secs(4));

    // Cancellation kills the child without waiting for the deadline.
    let cancel = Cancel::new();
    cancel.cancel();
    let runner = ProcessRunner::new(slow, Duration::from_secs(30), cancel);
    let start = Instant::now();
    let err = runner.run(&work, &["fetch"]).unwrap_err();
    assert!(err.to_string().contains("cancelled"), "{err}");
    assert!(start.elapsed() < Duration::from_secs(4));

    // A timeout too large to add to the clock means no deadline, not a panic.
    let runner = ProcessRunner::new(echo.clone(), Duration::from_secs(u64::MAX), Cancel::new());
    let out = runner.run(&work, &["--version"]).unwrap();
    assert_eq!(out.code, Some(3));
    assert_eq!(out.stderr, "oops");
    let runner = ProcessRunner::new(echo, Duration::MAX, Cancel::new());
    assert!(runner.run(&work, &["status"]).is_ok());

    // A background helper keeping stdout open does not hold the caller past the grace period.
    let runner = ProcessRunner::new(leaky, Duration::from_secs(30), Cancel::new());
    let start = Instant::now();
    let err = runner.run(&work, &["fetch"]).unwrap_err();
    assert!(err.to_string().contains("output stayed open"), "{err}");
    assert!(start.elapsed() < Duration::from_secs(4));

    // Spawn failure.
    let runner = ProcessRunner::new(
        tmp.path().join("missing-git"),
        Duration::from_secs(1),
        Cancel::new(),
    );
    assert!(runner.run(&work, &["status"]).is_err());
}

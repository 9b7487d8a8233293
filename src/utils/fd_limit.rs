//! Caps probe concurrency by the process file-descriptor limit (Unix).
//!
//! Every in-flight probe holds a child process with piped stdout/stderr, so a large
//! `--max-workers` on a host with a low `ulimit -n` would fail spawns with EMFILE.

/// Descriptors held per in-flight probe: two pipe read ends in the parent, the
/// write ends until spawn returns, `/dev/null` for stdin, plus the child handle.
pub const FDS_PER_WORKER: usize = 6;

/// Share of the soft limit probes may use; the rest stays with the walker and stdio.
const FD_LIMIT_FRACTION: f64 = 0.8;

/// Soft `RLIMIT_NOFILE`, or `None` if unavailable or unlimited.
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let rlim = unsafe { rlim.assume_init() };
    let cur = rlim.rlim_cur;
    if cur == libc::RLIM_INFINITY || cur > i64::MAX as u64 {
        return None;
    }
    Some(cur)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Probes that fit in `limit` descriptors; at least one.
pub fn workers_for_fd_limit(limit: u64) -> usize {
    let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
    (usable / FDS_PER_WORKER).max(1)
}

/// Worker ceiling from the current limit. `None` when there is no limit to respect.
pub fn max_workers_by_fd_limit() -> Option<usize> {
    max_open_fds().map(workers_for_fd_limit)
}

/// `requested`, lowered to the FD ceiling when needed; never below 1.
pub fn determine_workers_given_fd_limit(requested: usize) -> usize {
    let capped = match max_workers_by_fd_limit() {
        Some(max) if max < requested => {
            log::debug!("Capping workers {} -> {} (fd limit)", requested, max);
            max
        }
        _ => requested,
    };
    capped.max(1)
}

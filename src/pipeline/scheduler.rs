//! Scan scheduler: a fixed pool of worker threads probing candidates in discovery order.
//!
//! Workers claim the next index from a shared counter, probe it, store the result in that row's
//! slot and send a [`RowUpdate`]. Completion order is arbitrary; row order never changes.
//!
//! Cancellation stops new claims and (through the probe's own cancel flag) kills in-flight git
//! processes. Results that come back after cancellation are discarded, so unfinished rows stay
//! Pending rather than turning into errors.

use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::probe::Probe;
use crate::utils::config::WorkerLimits;
use crate::utils::fd_limit::determine_workers_given_fd_limit;
use crate::{Candidate, ProbeResult, RowUpdate, ScanOpts, ScanRow};

use super::context::ScanShared;

/// Worker count for `max_workers` (None = host parallelism), capped by the FD limit and by
/// the number of candidates.
pub fn determine_workers(max_workers: Option<usize>, candidates: usize) -> usize {
    let limits = WorkerLimits::current();
    let requested = max_workers
        .unwrap_or(limits.all_threads)
        .max(limits.floor);
    determine_workers_given_fd_limit(requested).min(candidates)
}

/// Single worker: claim, probe, record, notify; until the queue is drained or cancelled.
fn scan_worker_loop<P: Probe + ?Sized>(
    shared: Arc<ScanShared>,
    probe: Arc<P>,
    update_tx: Sender<RowUpdate>,
) {
    while let Some(index) = shared.claim() {
        let Some(candidate) = shared.candidate(index) else {
            break;
        };
        let result = panic::catch_unwind(AssertUnwindSafe(|| probe.probe(&candidate.path)))
            .unwrap_or_else(|_| ProbeResult::error("probe panicked"));
        if shared.cancel().is_cancelled() {
            debug!("Discarding result for {} (cancelled)", candidate.path.display());
            break;
        }
        if shared.record(index, result.clone()) {
            // Receiver may be gone; the row itself is already recorded.
            let _ = update_tx.send(RowUpdate { index, result });
        }
    }
    drop(update_tx);
}

/// A running scan. Read [`updates`](Self::updates) for progressive delivery or
/// [`snapshot`](Self::snapshot) at any time; [`wait_all`](Self::wait_all) to finish.
pub struct ScanHandle {
    shared: Arc<ScanShared>,
    update_rx: Receiver<RowUpdate>,
    worker_handles: Vec<JoinHandle<()>>,
}

impl ScanHandle {
    /// Completion notifications. The channel disconnects once every worker has exited.
    pub fn updates(&self) -> &Receiver<RowUpdate> {
        &self.update_rx
    }

    pub fn len(&self) -> usize {
        self.shared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.is_empty()
    }

    pub fn num_workers(&self) -> usize {
        self.worker_handles.len()
    }

    pub fn completed(&self) -> usize {
        self.shared.completed()
    }

    pub fn is_complete(&self) -> bool {
        self.shared.is_complete()
    }

    /// Rows in discovery order; rows not yet probed are Pending.
    pub fn snapshot(&self) -> Vec<ScanRow> {
        self.shared.snapshot()
    }

    /// Stop dispatching and kill in-flight probes. Completed rows are kept.
    pub fn cancel(&self) {
        self.shared.cancel().cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancel().is_cancelled()
    }

    /// Join all workers and return the final rows in discovery order. Every row is Done unless
    /// the scan was cancelled, in which case unfinished rows are still Pending.
    pub fn wait_all(self) -> Result<Vec<ScanRow>> {
        for h in self.worker_handles {
            h.join().map_err(|_| anyhow!("scan worker panicked"))?;
        }
        Ok(self.shared.snapshot())
    }
}

/// Start probing `candidates` with at most `opts.max_workers` probes in flight.
pub fn scan<P>(candidates: Vec<Candidate>, probe: Arc<P>, opts: &ScanOpts) -> ScanHandle
where
    P: Probe + ?Sized + 'static,
{
    let num_workers = determine_workers(opts.max_workers, candidates.len());
    // One update per row at most, so sends never block.
    let (update_tx, update_rx) = bounded::<RowUpdate>(candidates.len().max(1));
    let shared = Arc::new(ScanShared::new(candidates, opts.cancel.clone()));
    debug!(
        "Scanning {} candidates with {} workers",
        shared.len(),
        num_workers
    );

    let worker_handles = (0..num_workers)
        .map(|_| {
            let shared = Arc::clone(&shared);
            let probe = Arc::clone(&probe);
            let update_tx = update_tx.clone();
            thread::spawn(move || scan_worker_loop(shared, probe, update_tx))
        })
        .collect();

    // Dropping the last sender lets the channel disconnect when workers exit.
    drop(update_tx);

    ScanHandle {
        shared,
        update_rx,
        worker_handles,
    }
}

//! Scan state shared between the scheduler and its workers.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{Cancel, Candidate, ProbeResult, RowStatus, ScanRow};

/// Rows in discovery order plus the dispatch counter.
///
/// Each slot is written at most once (`OnceLock`), by the worker that claimed its index; readers
/// see either Pending or the final result, never a partial write.
pub struct ScanShared {
    candidates: Vec<Candidate>,
    slots: Vec<OnceLock<ProbeResult>>,
    next: AtomicUsize,
    completed: AtomicUsize,
    cancel: Cancel,
}

impl ScanShared {
    pub fn new(candidates: Vec<Candidate>, cancel: Cancel) -> Self {
        let slots = (0..candidates.len()).map(|_| OnceLock::new()).collect();
        Self {
            candidates,
            slots,
            next: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            cancel,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidate(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    pub fn cancel(&self) -> &Cancel {
        &self.cancel
    }

    /// Claim the next undispatched index. None once all are claimed or the scan is cancelled.
    pub fn claim(&self) -> Option<usize> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        (index < self.candidates.len()).then_some(index)
    }

    /// Store the result for `index`. Returns false if the row was already done.
    pub fn record(&self, index: usize, result: ProbeResult) -> bool {
        let Some(slot) = self.slots.get(index) else {
            return false;
        };
        if slot.set(result).is_err() {
            return false;
        }
        self.completed.fetch_add(1, Ordering::Release);
        true
    }

    pub fn status(&self, index: usize) -> RowStatus {
        match self.slots.get(index).and_then(OnceLock::get) {
            Some(result) => RowStatus::Done(result.clone()),
            None => RowStatus::Pending,
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    pub fn is_complete(&self) -> bool {
        self.completed() == self.candidates.len()
    }

    /// Current rows in discovery order; unfinished rows are Pending.
    pub fn snapshot(&self) -> Vec<ScanRow> {
        self.candidates
            .iter()
            .enumerate()
            .map(|(i, c)| ScanRow {
                candidate: c.clone(),
                status: self.status(i),
            })
            .collect()
    }
}

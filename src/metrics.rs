//! Contention counters shared by all workers of one harness.
//!
//! Every acquisition bumps a per-worker counter and a concurrently-held
//! gauge; the high-water mark of that gauge is the mutual-exclusion witness
//! (it must never exceed 1). Workers update the gauge strictly inside the
//! critical section, so a reading of 2 would mean two threads held the lock
//! at once.

use crate::worker::WorkerRole;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Atomic counters updated by the workers, read via [`snapshot`](Self::snapshot).
#[derive(Debug)]
pub struct ContentionMetrics {
    holder_acquisitions: AtomicU64,
    waiter_acquisitions: Vec<AtomicU64>,
    holders_now: AtomicUsize,
    max_concurrent_holders: AtomicUsize,
}

impl ContentionMetrics {
    /// Creates counters for one holder and `waiter_count` waiters.
    pub fn new(waiter_count: usize) -> Self {
        Self {
            holder_acquisitions: AtomicU64::new(0),
            waiter_acquisitions: (0..waiter_count).map(|_| AtomicU64::new(0)).collect(),
            holders_now: AtomicUsize::new(0),
            max_concurrent_holders: AtomicUsize::new(0),
        }
    }

    /// Records a successful acquisition. Must be called after the lock is
    /// taken and before any hold delay.
    pub fn on_acquired(&self, role: WorkerRole) {
        let now = self.holders_now.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent_holders.fetch_max(now, Ordering::SeqCst);
        match role {
            WorkerRole::Holder => {
                self.holder_acquisitions.fetch_add(1, Ordering::Relaxed);
            }
            WorkerRole::Waiter(ordinal) => {
                if let Some(count) = self.waiter_acquisitions.get(ordinal) {
                    count.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// Records an upcoming release. Must be called while the lock is still
    /// held, otherwise the gauge could observe a phantom second holder.
    pub fn on_released(&self) {
        self.holders_now.fetch_sub(1, Ordering::SeqCst);
    }

    /// Returns a point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            holder_acquisitions: self.holder_acquisitions.load(Ordering::Relaxed),
            waiter_acquisitions: self
                .waiter_acquisitions
                .iter()
                .map(|count| count.load(Ordering::Relaxed))
                .collect(),
            max_concurrent_holders: self.max_concurrent_holders.load(Ordering::SeqCst),
        }
    }
}

/// Counter values at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Times the holder won the lock.
    pub holder_acquisitions: u64,
    /// Times each waiter won the lock, indexed by ordinal.
    pub waiter_acquisitions: Vec<u64>,
    /// Most workers ever observed inside the critical section at once.
    pub max_concurrent_holders: usize,
}

impl MetricsSnapshot {
    /// Total acquisitions across the holder and all waiters.
    pub fn total_acquisitions(&self) -> u64 {
        self.holder_acquisitions + self.waiter_acquisitions.iter().sum::<u64>()
    }

    /// True when every worker won the lock at least once.
    pub fn all_workers_progressed(&self) -> bool {
        self.holder_acquisitions > 0 && self.waiter_acquisitions.iter().all(|&count| count > 0)
    }
}

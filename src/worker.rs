//! Worker thread implementation.
//!
//! Two behavior patterns run against the shared lock: the holder keeps it
//! for a long interval each cycle, and the waiters hammer it with short
//! holds. With the holder pinned apart from the waiters, every waiter
//! acquisition lands on the lock's contended path.
//!
//! Stop requests are cooperative: each loop polls its stop flag at the top
//! of the cycle, at a point where it holds nothing. A worker therefore
//! finishes any in-progress hold/release pair before exiting and can never
//! return while owning the lock.

use crate::config::StressConfig;
use crate::error::HarnessError;
use crate::metrics::ContentionMetrics;
use crate::topology;
use log::{debug, error, info};
use spin::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Identity of a worker within one harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerRole {
    /// The long-hold worker.
    Holder,
    /// A short-hold worker, identified by its creation ordinal.
    Waiter(usize),
}

impl WorkerRole {
    fn thread_name(&self) -> String {
        format!("spinstress-{self}")
    }
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerRole::Holder => write!(f, "holder"),
            WorkerRole::Waiter(ordinal) => write!(f, "waiter-{ordinal}"),
        }
    }
}

/// Everything a worker needs to run, fixed at spawn time and passed by
/// value into the thread.
#[derive(Debug, Clone)]
pub struct WorkerSpec {
    /// Which behavior pattern to run.
    pub role: WorkerRole,
    /// Unit to pin to, or `None` to run unpinned. The harness resolves
    /// offline targets to `None` before spawning.
    pub pin_to: Option<usize>,
    /// Timing parameters for the loop.
    pub config: StressConfig,
}

/// An owned handle to a running worker thread.
///
/// Dropping the handle without calling
/// [`request_stop_and_join`](Self::request_stop_and_join) detaches the
/// thread; the harness always stops its workers explicitly.
pub struct WorkerHandle {
    role: WorkerRole,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Spawns a worker thread for `spec`, contending on `lock`.
    pub fn spawn(
        spec: WorkerSpec,
        lock: Arc<Mutex<()>>,
        metrics: Arc<ContentionMetrics>,
    ) -> Result<Self, HarnessError> {
        let role = spec.role;
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name(role.thread_name())
            .spawn(move || run_worker(spec, lock, metrics, stop_flag))
            .map_err(|source| HarnessError::Spawn {
                name: role.to_string(),
                source,
            })?;

        Ok(WorkerHandle {
            role,
            stop,
            handle: Some(handle),
        })
    }

    /// Builds a handle around an externally spawned thread. Test seam for
    /// exercising the harness lifecycle without real contention loops.
    #[cfg(test)]
    pub(crate) fn from_parts(
        role: WorkerRole,
        stop: Arc<AtomicBool>,
        handle: JoinHandle<()>,
    ) -> Self {
        WorkerHandle {
            role,
            stop,
            handle: Some(handle),
        }
    }

    /// This worker's identity.
    pub fn role(&self) -> WorkerRole {
        self.role
    }

    /// True once [`request_stop_and_join`](Self::request_stop_and_join)
    /// has completed.
    pub fn is_stopped(&self) -> bool {
        self.handle.is_none()
    }

    /// Raises the stop flag and blocks until the worker's loop returns.
    ///
    /// Idempotent: a second call, or a call on a handle whose thread has
    /// already been joined, does nothing.
    pub fn request_stop_and_join(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        info!("stopping {}", self.role);
        self.stop.store(true, Ordering::Release);
        if handle.join().is_err() {
            error!("{} panicked before it could be joined", self.role);
        }
    }
}

impl fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("role", &self.role)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Thread entry point: apply pinning, run the role's loop, log the exit.
fn run_worker(
    spec: WorkerSpec,
    lock: Arc<Mutex<()>>,
    metrics: Arc<ContentionMetrics>,
    stop: Arc<AtomicBool>,
) {
    let role = spec.role;

    if let Some(unit) = spec.pin_to {
        if topology::pin_current(unit) {
            info!("{role}: pinned to unit {unit}");
        }
        // pin_current already warned on failure; keep running unpinned.
    }
    info!("{role}: running");

    match role {
        WorkerRole::Holder => holder_loop(role, &spec.config, &lock, &metrics, &stop),
        WorkerRole::Waiter(_) => waiter_loop(role, &spec.config, &lock, &metrics, &stop),
    }

    info!("{role}: exiting");
}

/// Acquire, hold long, release, pause briefly. The long hold gives the
/// waiters time to queue up on the lock.
fn holder_loop(
    role: WorkerRole,
    config: &StressConfig,
    lock: &Mutex<()>,
    metrics: &ContentionMetrics,
    stop: &AtomicBool,
) {
    while !stop.load(Ordering::Acquire) {
        let guard = lock.lock();
        metrics.on_acquired(role);
        info!("{role}: acquired lock");

        thread::sleep(config.holder_hold);

        metrics.on_released();
        drop(guard);
        info!("{role}: released lock");

        thread::sleep(config.holder_pause);
    }
}

/// Attempt acquisition (the contended-path trigger), hold briefly, release,
/// pause briefly.
fn waiter_loop(
    role: WorkerRole,
    config: &StressConfig,
    lock: &Mutex<()>,
    metrics: &ContentionMetrics,
    stop: &AtomicBool,
) {
    while !stop.load(Ordering::Acquire) {
        debug!("{role}: attempting acquisition");
        let guard = lock.lock();
        metrics.on_acquired(role);
        info!("{role}: acquired lock");

        thread::sleep(config.waiter_hold);

        metrics.on_released();
        drop(guard);
        info!("{role}: released lock");

        thread::sleep(config.waiter_pause);
    }
}

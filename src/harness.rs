//! Harness lifecycle: startup, steady state, rollback, shutdown.
//!
//! The [`ContentionHarness`] is the composition root. It owns the shared
//! lock, the holder handle, and the waiter handles; workers only ever see
//! the lock and the metrics, never each other. Owning everything in one
//! value keeps the harness resettable and lets tests run several instances
//! side by side.

use crate::config::StressConfig;
use crate::error::HarnessError;
use crate::metrics::{ContentionMetrics, MetricsSnapshot};
use crate::placement::Placement;
use crate::topology::Topology;
use crate::worker::{WorkerHandle, WorkerRole, WorkerSpec};
use log::{error, info, warn};
use spin::Mutex;
use std::sync::Arc;

/// Lifecycle states of a [`ContentionHarness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessState {
    /// Fresh instance, no workers exist.
    Uninitialized,
    /// Startup in progress.
    Initializing,
    /// All workers spawned and contending.
    Running,
    /// Ordered teardown in progress.
    Stopping,
    /// Teardown complete; the harness may be started again.
    Stopped,
    /// A spawn failed mid-startup; already-created workers are being undone.
    RollingBack,
    /// Startup failed. The harness holds no workers and may be restarted.
    Failed,
}

/// Spawns one holder and a topology-dependent number of waiters against a
/// single spin lock, then tears them down in an order that cannot strand a
/// spinning waiter.
pub struct ContentionHarness {
    config: StressConfig,
    state: HarnessState,
    lock: Option<Arc<Mutex<()>>>,
    metrics: Option<Arc<ContentionMetrics>>,
    holder: Option<WorkerHandle>,
    waiters: Vec<WorkerHandle>,
}

impl ContentionHarness {
    /// Creates a harness with the given timing configuration. No workers
    /// are created until [`start`](Self::start).
    pub fn new(config: StressConfig) -> Self {
        ContentionHarness {
            config,
            state: HarnessState::Uninitialized,
            lock: None,
            metrics: None,
            holder: None,
            waiters: Vec::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HarnessState {
        self.state
    }

    /// Number of waiter workers currently owned. Zero unless running.
    pub fn waiter_count(&self) -> usize {
        self.waiters.len()
    }

    /// Snapshot of the contention counters, if the harness has started at
    /// least once. Counters reset on every `start`.
    pub fn metrics(&self) -> Option<MetricsSnapshot> {
        self.metrics.as_ref().map(|metrics| metrics.snapshot())
    }

    /// Queries the topology, computes placement, and spawns the holder
    /// followed by each waiter.
    ///
    /// If any waiter spawn fails, the waiters created so far are stopped in
    /// reverse creation order, then the holder, and the originating spawn
    /// error is returned. If the holder itself fails to spawn there is
    /// nothing to undo. Pinning problems never fail startup; affected
    /// workers just run unpinned.
    pub fn start(&mut self) -> Result<(), HarnessError> {
        let topology = Topology::detect();
        let units = topology.online_units();
        self.start_inner(units, &topology, WorkerHandle::spawn)
    }

    /// Startup with an injected unit count and spawner. The public
    /// [`start`](Self::start) passes the detected topology and the real
    /// thread spawner; tests substitute both.
    fn start_inner<S>(
        &mut self,
        online_units: usize,
        topology: &Topology,
        mut spawn: S,
    ) -> Result<(), HarnessError>
    where
        S: FnMut(
            WorkerSpec,
            Arc<Mutex<()>>,
            Arc<ContentionMetrics>,
        ) -> Result<WorkerHandle, HarnessError>,
    {
        if self.state == HarnessState::Running {
            return Err(HarnessError::AlreadyRunning);
        }
        self.state = HarnessState::Initializing;

        let placement = Placement::compute(online_units);
        info!(
            "starting: {} unit(s) online, 1 holder + {} waiter(s)",
            online_units,
            placement.waiter_count()
        );

        let lock = Arc::new(Mutex::new(()));
        let metrics = Arc::new(ContentionMetrics::new(placement.waiter_count()));

        let holder_spec = WorkerSpec {
            role: WorkerRole::Holder,
            pin_to: resolve_pin(topology, WorkerRole::Holder, placement.holder_unit()),
            config: self.config.clone(),
        };
        match spawn(holder_spec, Arc::clone(&lock), Arc::clone(&metrics)) {
            Ok(handle) => self.holder = Some(handle),
            Err(err) => {
                error!("startup aborted ({}): {err}", err.as_label());
                self.state = HarnessState::Failed;
                return Err(err);
            }
        }

        for ordinal in 0..placement.waiter_count() {
            let role = WorkerRole::Waiter(ordinal);
            let spec = WorkerSpec {
                role,
                pin_to: resolve_pin(topology, role, placement.waiter_unit(ordinal)),
                config: self.config.clone(),
            };
            match spawn(spec, Arc::clone(&lock), Arc::clone(&metrics)) {
                Ok(handle) => self.waiters.push(handle),
                Err(err) => {
                    error!("startup failed at {role} ({}): {err}", err.as_label());
                    self.roll_back();
                    return Err(err);
                }
            }
        }

        self.lock = Some(lock);
        self.metrics = Some(metrics);
        self.state = HarnessState::Running;
        info!("running: all workers created, lock contention in progress");
        Ok(())
    }

    /// Undoes a partial startup: waiters in reverse creation order, then
    /// the holder.
    fn roll_back(&mut self) {
        self.state = HarnessState::RollingBack;
        while let Some(mut waiter) = self.waiters.pop() {
            waiter.request_stop_and_join();
        }
        if let Some(mut holder) = self.holder.take() {
            holder.request_stop_and_join();
        }
        self.state = HarnessState::Failed;
    }

    /// Stops every waiter in ascending creation order, then the holder.
    ///
    /// Waiters go first so the holder cannot disappear while they are still
    /// spinning on a lock nobody would release. Each stop blocks until that
    /// worker's loop has returned. Calling this on a harness that is not
    /// running is a no-op.
    pub fn shutdown(&mut self) {
        if self.state != HarnessState::Running {
            return;
        }
        self.state = HarnessState::Stopping;
        info!("shutting down: waiters first, then the holder");

        for waiter in &mut self.waiters {
            waiter.request_stop_and_join();
        }
        self.waiters.clear();
        if let Some(mut holder) = self.holder.take() {
            holder.request_stop_and_join();
        }
        self.lock = None;

        self.state = HarnessState::Stopped;
        info!("shutdown complete");
    }
}

impl Default for ContentionHarness {
    fn default() -> Self {
        ContentionHarness::new(StressConfig::default())
    }
}

impl Drop for ContentionHarness {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Keeps `unit` as the pin target only if it is online right now.
fn resolve_pin(topology: &Topology, role: WorkerRole, unit: usize) -> Option<usize> {
    if topology.is_unit_online(unit) {
        Some(unit)
    } else {
        warn!("{role}: target unit {unit} is offline, will run unpinned");
        None
    }
}

//! CPU topology queries and thread pinning.
//!
//! Thin wrapper over `core_affinity`. The harness only needs three answers:
//! how many units are online, whether a specific unit is online, and a way
//! for a worker thread to bind itself to a unit. Pinning is always
//! best-effort; a refused request leaves the thread on the scheduler's
//! default placement.

use core_affinity::CoreId;
use log::warn;

/// Snapshot of the processing units visible to this process.
#[derive(Debug, Clone)]
pub struct Topology {
    cores: Vec<CoreId>,
}

impl Topology {
    /// Queries the host for the currently online units.
    pub fn detect() -> Self {
        let cores = core_affinity::get_core_ids().unwrap_or_default();
        Topology { cores }
    }

    /// Number of online units. Never less than 1, so placement math stays
    /// defined even when the affinity query comes back empty.
    pub fn online_units(&self) -> usize {
        self.cores.len().max(1)
    }

    /// Whether `unit` is currently online.
    pub fn is_unit_online(&self, unit: usize) -> bool {
        self.cores.iter().any(|core| core.id == unit)
    }
}

/// Binds the calling thread to `unit`. Returns `true` on success.
///
/// Called from inside each spawned worker, since affinity can only be set
/// for the current thread. Failure is logged and otherwise ignored.
pub fn pin_current(unit: usize) -> bool {
    let Some(cores) = core_affinity::get_core_ids() else {
        warn!("affinity query failed, unit {unit} request ignored");
        return false;
    };
    match cores.into_iter().find(|core| core.id == unit) {
        Some(core) => core_affinity::set_for_current(core),
        None => {
            warn!("unit {unit} is not online, running unpinned");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_reports_at_least_one_unit() {
        let topo = Topology::detect();
        assert!(topo.online_units() >= 1);
    }

    #[test]
    fn empty_topology_still_counts_one_unit() {
        let topo = Topology { cores: Vec::new() };
        assert_eq!(topo.online_units(), 1);
        assert!(!topo.is_unit_online(0));
    }

    #[test]
    fn online_check_matches_detected_set() {
        let topo = Topology::detect();
        if let Some(first) = topo.cores.first() {
            assert!(topo.is_unit_online(first.id));
        }
        assert!(!topo.is_unit_online(usize::MAX));
    }

    #[test]
    fn pin_to_offline_unit_is_refused() {
        assert!(!pin_current(usize::MAX));
    }
}

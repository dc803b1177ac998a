//! Worker placement policy.
//!
//! Decides, from the number of online units, how many waiters to run and
//! which unit each worker targets. The policy is what makes contention
//! reproducible: the holder owns unit 0 and the waiters are spread
//! round-robin over the remaining units so every acquisition attempt crosses
//! cores. It is a pure function of the unit count so it can be tested
//! without touching the host topology.

use log::warn;

/// Upper bound on waiter workers, regardless of how many units are online.
pub const MAX_WAITERS: usize = 4;

/// A computed placement: waiter count plus a target unit per worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    waiter_count: usize,
    holder_unit: usize,
    waiter_units: Vec<usize>,
}

impl Placement {
    /// Computes the placement for `online_units` processing units.
    ///
    /// Three or more waiters need at least four units to each get their own
    /// core next to the holder; the count steps down with the topology.
    /// Below three units the contended path is unlikely to be exercised,
    /// which is worth a warning but not a refusal to run.
    pub fn compute(online_units: usize) -> Self {
        let units = online_units.max(1);

        let waiter_count = if units >= 4 {
            3
        } else if units >= 3 {
            2
        } else {
            warn!("only {units} unit(s) online, contended path may not trigger");
            1
        }
        .clamp(1, MAX_WAITERS);

        let waiter_units = (0..waiter_count).map(|i| (i + 1) % units).collect();

        Placement {
            waiter_count,
            holder_unit: 0,
            waiter_units,
        }
    }

    /// Number of waiter workers to create.
    pub fn waiter_count(&self) -> usize {
        self.waiter_count
    }

    /// Target unit for the holder worker.
    pub fn holder_unit(&self) -> usize {
        self.holder_unit
    }

    /// Target unit for waiter `ordinal`.
    ///
    /// # Panics
    ///
    /// Panics if `ordinal >= waiter_count()`.
    pub fn waiter_unit(&self, ordinal: usize) -> usize {
        self.waiter_units[ordinal]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_units_runs_three_waiters_on_distinct_cores() {
        let p = Placement::compute(4);
        assert_eq!(p.waiter_count(), 3);
        assert_eq!(p.holder_unit(), 0);
        assert_eq!(
            (0..3).map(|i| p.waiter_unit(i)).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn three_units_runs_two_waiters() {
        let p = Placement::compute(3);
        assert_eq!(p.waiter_count(), 2);
        assert_eq!(p.waiter_unit(0), 1);
        assert_eq!(p.waiter_unit(1), 2);
    }

    #[test]
    fn two_units_runs_one_waiter_off_the_holder_core() {
        let p = Placement::compute(2);
        assert_eq!(p.waiter_count(), 1);
        assert_eq!(p.waiter_unit(0), 1);
    }

    #[test]
    fn single_unit_still_runs_one_waiter() {
        let p = Placement::compute(1);
        assert_eq!(p.waiter_count(), 1);
        assert_eq!(p.holder_unit(), 0);
        // Only one unit exists, so the waiter wraps back onto it.
        assert_eq!(p.waiter_unit(0), 0);
    }

    #[test]
    fn zero_units_is_treated_as_one() {
        assert_eq!(Placement::compute(0), Placement::compute(1));
    }

    #[test]
    fn many_units_stays_at_three_waiters() {
        let p = Placement::compute(64);
        assert_eq!(p.waiter_count(), 3);
        assert_eq!(
            (0..3).map(|i| p.waiter_unit(i)).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }
}

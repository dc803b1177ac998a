//! Tuning knobs for the contention workload.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing configuration for the holder and waiter loops.
///
/// The defaults are tuned to reliably push a spinlock onto its contended
/// path on a typical multi-core host: the holder keeps the lock long enough
/// for every waiter to start spinning, and the short pauses keep all workers
/// competing back-to-back. Only the relative ordering matters (the holder
/// must hold much longer than the waiters); the literals are tunable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressConfig {
    /// How long the holder keeps the lock each cycle. Default: 200ms.
    pub holder_hold: Duration,
    /// Holder pause between release and the next acquisition. Default: 10ms.
    pub holder_pause: Duration,
    /// How long a waiter keeps the lock once it wins it. Default: 50ms.
    pub waiter_hold: Duration,
    /// Waiter pause between release and the next attempt. Default: 20ms.
    pub waiter_pause: Duration,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            holder_hold: Duration::from_millis(200),
            holder_pause: Duration::from_millis(10),
            waiter_hold: Duration::from_millis(50),
            waiter_pause: Duration::from_millis(20),
        }
    }
}

impl StressConfig {
    /// A compressed schedule for tests: same shape, milliseconds instead of
    /// hundreds of milliseconds, so suites finish quickly.
    pub fn fast() -> Self {
        Self {
            holder_hold: Duration::from_millis(20),
            holder_pause: Duration::from_millis(2),
            waiter_hold: Duration::from_millis(5),
            waiter_pause: Duration::from_millis(2),
        }
    }
}

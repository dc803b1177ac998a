//! # spinstress - Spinlock Contention Harness
//!
//! A workload generator that deliberately manufactures spinlock contention
//! to exercise a lock's contended path. One holder thread grabs a shared
//! [`spin::Mutex`] and sits on it for a long interval each cycle while
//! several waiter threads, pinned to neighboring CPU cores, hammer the same
//! lock with short holds. The asymmetry guarantees the waiters spend most of
//! their time spinning in the lock's slow path.
//!
//! The crate does not implement a lock and does not measure anything beyond
//! the counters its own tests need; it only generates the workload and
//! manages the worker lifecycle (placement, spawn, pinning, ordered
//! teardown, rollback on partial startup failure).
//!
//! ## Example
//!
//! ```no_run
//! use spinstress::{ContentionHarness, StressConfig};
//! use std::time::Duration;
//!
//! let mut harness = ContentionHarness::new(StressConfig::default());
//! harness.start().expect("failed to start workers");
//!
//! std::thread::sleep(Duration::from_secs(2));
//!
//! harness.shutdown();
//! ```

pub mod config;
pub mod error;
pub mod harness;
pub mod metrics;
pub mod placement;
pub mod topology;
pub mod worker;

pub use config::StressConfig;
pub use error::HarnessError;
pub use harness::{ContentionHarness, HarnessState};
pub use metrics::MetricsSnapshot;
pub use placement::Placement;
pub use worker::WorkerRole;

//! Error types surfaced by the harness.
//!
//! Only worker creation can fail in a way the caller needs to know about.
//! Pinning failures and low-topology conditions are absorbed as log warnings,
//! and shutdown has no failure path at all.

use std::io;
use thiserror::Error;

/// Errors returned by [`ContentionHarness::start`](crate::ContentionHarness::start).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HarnessError {
    /// The host scheduler could not create a worker thread. Startup rolls
    /// back every worker created so far and reports the originating error.
    #[error("failed to spawn {name}: {source}")]
    Spawn {
        /// Name of the worker that failed to spawn.
        name: String,
        /// The spawn error reported by the OS.
        #[source]
        source: io::Error,
    },

    /// `start()` was called while the harness was already running.
    #[error("harness is already running")]
    AlreadyRunning,
}

impl HarnessError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            HarnessError::Spawn { .. } => "spawn_failed",
            HarnessError::AlreadyRunning => "already_running",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_error_carries_source() {
        let err = HarnessError::Spawn {
            name: "waiter-2".into(),
            source: io::Error::new(io::ErrorKind::OutOfMemory, "no threads left"),
        };
        assert_eq!(err.as_label(), "spawn_failed");
        assert!(err.to_string().contains("waiter-2"));
        assert!(std::error::Error::source(&err).is_some());
    }
}

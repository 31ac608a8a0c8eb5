//! Simulation Error Types
//!
//! The core has one real error class: a broken membership or capacity
//! invariant. Those are programming defects, so every worker that detects
//! one stops the whole simulation and the orchestrator reports it.

use super::clock::Tick;
use super::process::Pid;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Invariant Violations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A state transition found the shared state inconsistent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// Process would end up in two membership sets at once
    #[error("process {pid} is already {location}")]
    DuplicateMembership {
        /// Offending process
        pid: Pid,
        /// Where it already lives ("ready", "blocked", "finished", "running")
        location: &'static str,
    },

    /// Unblock or admission targeted a process that is not blocked
    #[error("process {pid} is not registered as blocked")]
    NotBlocked {
        /// Offending process
        pid: Pid,
    },

    /// Admission would exceed the device capacity
    #[error("device {device} admitted {in_service} processes with capacity {capacity}")]
    CapacityExceeded {
        /// Device name
        device: String,
        /// In-service count after the faulty admission
        in_service: usize,
        /// Configured capacity
        capacity: usize,
    },

    /// Release of a process that does not hold a slot on the device
    #[error("process {pid} is not in service on device {device}")]
    NotInService {
        /// Offending process
        pid: Pid,
        /// Device name
        device: String,
    },

    /// Second device attached to a process within one block episode
    #[error("process {pid} is already using device {device}")]
    AlreadyAttached {
        /// Offending process
        pid: Pid,
        /// Device currently attached
        device: String,
    },

    /// Detach on a process with no device
    #[error("process {pid} has no device attached")]
    NotAttached {
        /// Offending process
        pid: Pid,
    },

    /// A transition needed the running slot but it was empty
    #[error("no process is currently running")]
    NoRunningProcess,

    /// Device admission started a second countdown for the same block episode
    #[error("countdown for process {pid} already started")]
    CountdownAlreadyStarted {
        /// Offending process
        pid: Pid,
    },

    /// Process unblocked before its countdown elapsed
    #[error("process {pid} unblocked at {clock} before its unblock time {unblock_at}")]
    EarlyUnblock {
        /// Offending process
        pid: Pid,
        /// Clock value observed at unblock
        clock: Tick,
        /// Registered unblock time
        unblock_at: Tick,
    },

    /// Membership sets do not add up to the full process set
    #[error("membership covers {accounted} processes, expected {expected}")]
    PartitionMismatch {
        /// Processes found across all sets
        accounted: usize,
        /// Processes loaded into the simulation
        expected: usize,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Simulation Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Top-level error returned by [`OperatingSystem::run`](super::OperatingSystem::run)
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A worker detected an inconsistent state and aborted the run
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    /// A worker thread panicked
    #[error("worker `{worker}` panicked")]
    WorkerPanicked {
        /// Worker thread name
        worker: String,
    },

    /// A worker thread could not be spawned
    #[error("failed to spawn worker `{worker}`: {source}")]
    Spawn {
        /// Worker thread name
        worker: String,
        /// OS error
        #[source]
        source: std::io::Error,
    },

    /// Workload rejected before any worker started
    #[error("invalid workload: {0}")]
    InvalidWorkload(String),
}

/// Convenience alias for simulation results
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_display() {
        let err = InvariantViolation::CapacityExceeded {
            device: "disk".to_string(),
            in_service: 3,
            capacity: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("disk"));
        assert!(msg.contains("capacity 2"));
    }

    #[test]
    fn test_invariant_converts_into_sim_error() {
        let err: SimError = InvariantViolation::NotBlocked { pid: Pid::new("P1") }.into();
        assert!(matches!(err, SimError::Invariant(_)));
        assert!(err.to_string().contains("P1"));
    }
}

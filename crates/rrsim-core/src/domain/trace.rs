//! Trace Port - what the core tells the output collaborator
//!
//! The scheduler reports one [`CycleTrace`] per dispatch cycle, the watcher
//! reports each unblock, and the orchestrator hands over the final report.
//! Rendering and persistence live in `crate::adapters`.

use super::clock::Tick;
use super::process::{Pid, ProcessSnapshot};
use super::device::DeviceSnapshot;
use super::system::{Completion, SimulationReport};
use serde::Serialize;

/// Consistent view of the shared state, taken under the state lock
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemSnapshot {
    /// Ready queue, head first
    pub ready: Vec<ProcessSnapshot>,

    /// Process in the running slot
    pub running: Option<ProcessSnapshot>,

    /// Blocked processes, in arrival order
    pub blocked: Vec<BlockedSnapshot>,

    /// Device queues, in device table order
    pub devices: Vec<DeviceSnapshot>,

    /// Completions so far
    pub finished: Vec<Completion>,
}

/// Blocked process with its device and countdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedSnapshot {
    /// Process state
    pub process: ProcessSnapshot,

    /// Device servicing (or queueing) the request
    pub device: String,

    /// Unblock time, `None` while waiting for a device slot
    pub unblock_at: Option<Tick>,
}

/// What happened to the dispatched process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BurstOutcome {
    /// CPU-only burst, process re-queued
    Cpu {
        /// Units consumed
        consumed: Tick,
    },

    /// Partial burst followed by a device request
    Blocked {
        /// Units consumed before the request fired
        consumed: Tick,
        /// Device the request went to
        device: String,
        /// Unblock time if admitted immediately
        unblock_at: Option<Tick>,
    },

    /// Remaining time reached zero
    Finished {
        /// Units consumed in this cycle
        consumed: Tick,
    },
}

impl BurstOutcome {
    /// Units consumed by the burst
    pub fn consumed(&self) -> Tick {
        match self {
            BurstOutcome::Cpu { consumed }
            | BurstOutcome::Blocked { consumed, .. }
            | BurstOutcome::Finished { consumed } => *consumed,
        }
    }
}

/// One dispatch cycle as seen by the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleTrace {
    /// 1-based dispatch cycle number
    pub cycle: u64,

    /// Clock before the burst
    pub clock_before: Tick,

    /// Clock after the burst
    pub clock_after: Tick,

    /// Dispatched process
    pub pid: Pid,

    /// Remaining time before the burst
    pub remaining_before: Tick,

    /// Result of the burst
    pub outcome: BurstOutcome,

    /// State right after the cycle's transition
    pub snapshot: SystemSnapshot,
}

/// Output collaborator
///
/// Called from worker threads, so implementations must be `Send + Sync`.
/// Every method has an empty default body.
pub trait TraceSink: Send + Sync {
    /// A dispatch cycle completed
    fn on_cycle(&self, _trace: &CycleTrace) {}

    /// The watcher moved `pid` back to `ready` at `clock`
    fn on_unblock(&self, _pid: &Pid, _clock: Tick) {}

    /// Every worker exited
    fn on_finish(&self, _report: &SimulationReport) {}
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TraceSink for NullSink {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_consumed() {
        assert_eq!(BurstOutcome::Cpu { consumed: 4 }.consumed(), 4);
        assert_eq!(BurstOutcome::Finished { consumed: 1 }.consumed(), 1);
        assert_eq!(
            BurstOutcome::Blocked {
                consumed: 0,
                device: "disk".into(),
                unblock_at: None
            }
            .consumed(),
            0
        );
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let json = serde_json::to_string(&BurstOutcome::Cpu { consumed: 3 }).unwrap();
        assert_eq!(json, r#"{"kind":"cpu","consumed":3}"#);
    }
}

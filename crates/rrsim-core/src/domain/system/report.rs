//! Simulation Report

use crate::domain::clock::Tick;
use crate::domain::process::Pid;
use serde::Serialize;

/// A finished process and the clock value at which it finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// Finished process
    pub pid: Pid,
    /// Clock value after its last unit
    pub completed_at: Tick,
}

/// Per-device counters collected at shutdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceStats {
    /// Device name
    pub name: String,
    /// Configured capacity
    pub capacity: usize,
    /// Highest number of simultaneous in-service processes
    pub peak_in_service: usize,
    /// Requests admitted over the whole run
    pub admissions: u64,
}

/// Outcome of a full run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    /// Completions, in the order they happened
    pub completions: Vec<Completion>,

    /// Clock value when the scheduler stopped
    pub final_clock: Tick,

    /// Dispatch cycles executed
    pub dispatch_cycles: u64,

    /// Clock units added while nothing was ready
    pub idle_ticks: u64,

    /// Processes moved back to ready by the watcher
    pub unblocks: u64,

    /// Device counters, in load order
    pub devices: Vec<DeviceStats>,
}

impl SimulationReport {
    /// Completion time of `pid`, if it finished
    pub fn completion_of(&self, pid: &str) -> Option<Tick> {
        self.completions
            .iter()
            .find(|c| c.pid.as_str() == pid)
            .map(|c| c.completed_at)
    }

    /// Pids in completion order
    pub fn completion_order(&self) -> Vec<&str> {
        self.completions.iter().map(|c| c.pid.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_lookup() {
        let report = SimulationReport {
            completions: vec![
                Completion {
                    pid: Pid::new("P2"),
                    completed_at: 5,
                },
                Completion {
                    pid: Pid::new("P1"),
                    completed_at: 9,
                },
            ],
            final_clock: 9,
            dispatch_cycles: 4,
            idle_ticks: 0,
            unblocks: 0,
            devices: Vec::new(),
        };

        assert_eq!(report.completion_of("P1"), Some(9));
        assert_eq!(report.completion_of("P3"), None);
        assert_eq!(report.completion_order(), vec!["P2", "P1"]);
    }
}

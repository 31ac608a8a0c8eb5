//! Shared Scheduler State
//!
//! Owned by the orchestrator behind one mutex and shared by every worker.
//!
//! ```text
//! SchedulerState
//!   ├─ ready:    VecDeque<Arc<Process>>   FIFO dispatch order
//!   ├─ running:  Option<Arc<Process>>     popped for the current dispatch cycle
//!   ├─ blocked:  Vec<BlockedEntry>        arrival order, unblock_at once admitted
//!   └─ finished: Vec<Completion>          completion order
//! ```
//!
//! # Invariants
//! - The four sets are pairwise disjoint and together hold every process.
//! - A blocked entry has `unblock_at == None` while its request waits in the
//!   device queue and `Some(t)` from the moment it occupies a device slot.
//! - A process leaves `blocked` only at a clock value `>= unblock_at`.
//!
//! Every method that moves a process checks the target set first and reports
//! an [`InvariantViolation`] instead of silently duplicating membership.

use super::clock::Tick;
use super::device::Device;
use super::error::InvariantViolation;
use super::process::{Pid, Process};
use super::system::Completion;
use super::trace::{BlockedSnapshot, SystemSnapshot};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// One blocked process and the device it waits on
#[derive(Debug, Clone)]
pub struct BlockedEntry {
    /// Blocked process
    pub process: Arc<Process>,

    /// Device the request was sent to
    pub device: Arc<Device>,

    /// Clock value at which the process may return to `ready`
    pub unblock_at: Option<Tick>,
}

/// Ready queue, running slot, blocked map and finished map
#[derive(Debug, Default)]
pub struct SchedulerState {
    ready: VecDeque<Arc<Process>>,
    running: Option<Arc<Process>>,
    blocked: Vec<BlockedEntry>,
    finished: Vec<Completion>,
}

impl SchedulerState {
    /// Create the initial state with every process ready, in load order
    pub fn new(processes: Vec<Arc<Process>>) -> Self {
        Self {
            ready: processes.into(),
            ..Self::default()
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Dispatch transitions (scheduler)
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Move the head of `ready` into the running slot
    ///
    /// Returns `None` if `ready` is empty.
    pub fn pop_ready(&mut self) -> Result<Option<Arc<Process>>, InvariantViolation> {
        if let Some(current) = &self.running {
            return Err(InvariantViolation::DuplicateMembership {
                pid: current.pid().clone(),
                location: "running",
            });
        }
        let Some(process) = self.ready.pop_front() else {
            return Ok(None);
        };
        self.running = Some(Arc::clone(&process));
        Ok(Some(process))
    }

    /// Currently running process
    pub fn running(&self) -> Option<&Arc<Process>> {
        self.running.as_ref()
    }

    /// Put the running process back at the tail of `ready`
    pub fn requeue_running(&mut self) -> Result<Arc<Process>, InvariantViolation> {
        let process = self.take_running()?;
        self.ready.push_back(Arc::clone(&process));
        Ok(process)
    }

    /// Register the running process as blocked on `device`
    ///
    /// The countdown starts later, when the device admits the request.
    pub fn block_running(&mut self, device: Arc<Device>) -> Result<Arc<Process>, InvariantViolation> {
        let process = self.take_running()?;
        self.blocked.push(BlockedEntry {
            process: Arc::clone(&process),
            device,
            unblock_at: None,
        });
        Ok(process)
    }

    /// Record the running process as finished at `now`
    pub fn finish_running(&mut self, now: Tick) -> Result<Completion, InvariantViolation> {
        let process = self.take_running()?;
        let completion = Completion {
            pid: process.pid().clone(),
            completed_at: now,
        };
        self.finished.push(completion.clone());
        Ok(completion)
    }

    fn take_running(&mut self) -> Result<Arc<Process>, InvariantViolation> {
        let process = self.running.take().ok_or(InvariantViolation::NoRunningProcess)?;
        if let Some(location) = self.location_of(process.pid()) {
            return Err(InvariantViolation::DuplicateMembership {
                pid: process.pid().clone(),
                location,
            });
        }
        Ok(process)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Blocking bookkeeping (devices, watcher)
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Start the countdown of a freshly admitted process
    pub fn start_countdown(&mut self, pid: &Pid, unblock_at: Tick) -> Result<(), InvariantViolation> {
        let entry = self
            .blocked
            .iter_mut()
            .find(|entry| entry.process.pid() == pid)
            .ok_or_else(|| InvariantViolation::NotBlocked { pid: pid.clone() })?;

        if entry.unblock_at.is_some() {
            return Err(InvariantViolation::CountdownAlreadyStarted { pid: pid.clone() });
        }
        entry.unblock_at = Some(unblock_at);
        Ok(())
    }

    /// Registered unblock time of `pid`
    ///
    /// `None` if the process is not blocked, `Some(None)` if it is still
    /// waiting for a device slot.
    pub fn unblock_time(&self, pid: &Pid) -> Option<Option<Tick>> {
        self.blocked
            .iter()
            .find(|entry| entry.process.pid() == pid)
            .map(|entry| entry.unblock_at)
    }

    /// Copy of every running countdown, in arrival order
    ///
    /// The watcher iterates this copy without holding the lock.
    pub fn countdowns(&self) -> Vec<(Arc<Process>, Tick)> {
        self.blocked
            .iter()
            .filter_map(|entry| entry.unblock_at.map(|t| (Arc::clone(&entry.process), t)))
            .collect()
    }

    /// Check whether some countdown has already elapsed at `now`
    pub fn has_due(&self, now: Tick) -> bool {
        self.blocked
            .iter()
            .any(|entry| entry.unblock_at.is_some_and(|t| t <= now))
    }

    /// Move an expired process from `blocked` to the tail of `ready`
    ///
    /// Detaches the process from its device, which frees the capacity slot.
    pub fn unblock(&mut self, pid: &Pid, now: Tick) -> Result<Arc<Process>, InvariantViolation> {
        let index = self
            .blocked
            .iter()
            .position(|entry| entry.process.pid() == pid)
            .ok_or_else(|| InvariantViolation::NotBlocked { pid: pid.clone() })?;

        let entry = &self.blocked[index];
        match entry.unblock_at {
            Some(unblock_at) if now >= unblock_at => {}
            Some(unblock_at) => {
                return Err(InvariantViolation::EarlyUnblock {
                    pid: pid.clone(),
                    clock: now,
                    unblock_at,
                })
            }
            None => {
                return Err(InvariantViolation::NotInService {
                    pid: pid.clone(),
                    device: entry.device.name().to_string(),
                })
            }
        }

        entry.process.detach_device()?;
        let entry = self.blocked.remove(index);
        self.ready.push_back(Arc::clone(&entry.process));
        debug!(pid = %pid, clock = now, device = %entry.device.name(), "unblocked");
        Ok(entry.process)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Queries
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// No process is ready, running or blocked
    pub fn is_drained(&self) -> bool {
        self.ready.is_empty() && self.running.is_none() && self.blocked.is_empty()
    }

    /// Number of ready processes
    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    /// Number of blocked processes
    pub fn blocked_len(&self) -> usize {
        self.blocked.len()
    }

    /// Completions in the order they happened
    pub fn finished(&self) -> &[Completion] {
        &self.finished
    }

    /// Set currently holding `pid`, if any
    pub fn location_of(&self, pid: &Pid) -> Option<&'static str> {
        if self.ready.iter().any(|p| p.pid() == pid) {
            Some("ready")
        } else if self.running.as_ref().is_some_and(|p| p.pid() == pid) {
            Some("running")
        } else if self.blocked.iter().any(|e| e.process.pid() == pid) {
            Some("blocked")
        } else if self.finished.iter().any(|c| &c.pid == pid) {
            Some("finished")
        } else {
            None
        }
    }

    /// Verify that the membership sets partition `expected` processes
    pub fn check_partition(&self, expected: usize) -> Result<(), InvariantViolation> {
        let mut seen = HashSet::with_capacity(expected);
        let members = self
            .ready
            .iter()
            .map(|p| (p.pid(), "ready"))
            .chain(self.running.iter().map(|p| (p.pid(), "running")))
            .chain(self.blocked.iter().map(|e| (e.process.pid(), "blocked")))
            .chain(self.finished.iter().map(|c| (&c.pid, "finished")));

        for (pid, location) in members {
            if !seen.insert(pid) {
                return Err(InvariantViolation::DuplicateMembership {
                    pid: pid.clone(),
                    location,
                });
            }
        }

        if seen.len() != expected {
            return Err(InvariantViolation::PartitionMismatch {
                accounted: seen.len(),
                expected,
            });
        }
        Ok(())
    }

    /// Capture ready, blocked and device queues for tracing
    pub fn snapshot(&self, devices: &[Arc<Device>]) -> SystemSnapshot {
        SystemSnapshot {
            ready: self.ready.iter().map(|p| p.snapshot()).collect(),
            running: self.running.as_ref().map(|p| p.snapshot()),
            blocked: self
                .blocked
                .iter()
                .map(|entry| BlockedSnapshot {
                    process: entry.process.snapshot(),
                    device: entry.device.name().to_string(),
                    unblock_at: entry.unblock_at,
                })
                .collect(),
            devices: devices.iter().map(|d| d.snapshot()).collect(),
            finished: self.finished.clone(),
        }
    }
}

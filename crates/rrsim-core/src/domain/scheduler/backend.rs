//! Dispatch Decisions Abstraction
//!
//! The three random draws of a dispatch cycle (device roll, request point,
//! device choice) sit behind this trait so a run can be driven either by a
//! random source or by a fixed script.

use super::types::BurstPlan;
use crate::domain::clock::Tick;
use crate::domain::process::Process;

/// Source of per-cycle dispatch decisions
///
/// Implementations are moved into the scheduler thread, hence `Send`.
/// The scheduler normalizes whatever plan is returned
/// (see [`BurstPlan::normalize`]), so implementations need not clamp.
pub trait DispatchDecisions: Send {
    /// Decide how `process` spends this cycle's CPU slice
    fn plan(&mut self, process: &Process, cpu_fraction: Tick, device_count: usize) -> BurstPlan;
}

impl<F> DispatchDecisions for F
where
    F: FnMut(&Process, Tick, usize) -> BurstPlan + Send,
{
    fn plan(&mut self, process: &Process, cpu_fraction: Tick, device_count: usize) -> BurstPlan {
        self(process, cpu_fraction, device_count)
    }
}

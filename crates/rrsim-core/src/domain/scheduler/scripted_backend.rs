//! Scripted Backend - replay a fixed sequence of plans
//!
//! Used for deterministic runs: each dispatch cycle consumes the next plan
//! in the script, and an exhausted script yields `BurstPlan::Cpu`.

use super::backend::DispatchDecisions;
use super::types::BurstPlan;
use crate::domain::clock::Tick;
use crate::domain::process::Process;
use std::collections::VecDeque;

/// Replayed dispatch decisions
///
/// # Example
///
/// ```rust
/// use rrsim_core::domain::process::{Process, ProcessSpec};
/// use rrsim_core::domain::scheduler::{BurstPlan, DispatchDecisions, ScriptedDecisions};
///
/// let p = Process::new(ProcessSpec::new("P1", 10, 100));
/// let mut script = ScriptedDecisions::new([BurstPlan::Device { request_point: 2, device: 0 }]);
///
/// assert_eq!(script.plan(&p, 3, 1), BurstPlan::Device { request_point: 2, device: 0 });
/// assert_eq!(script.plan(&p, 3, 1), BurstPlan::Cpu);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecisions {
    plans: VecDeque<BurstPlan>,
    consumed: usize,
}

impl ScriptedDecisions {
    /// Script that replays `plans` in order
    pub fn new(plans: impl IntoIterator<Item = BurstPlan>) -> Self {
        Self {
            plans: plans.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Script that never requests a device
    pub fn cpu_only() -> Self {
        Self::default()
    }

    /// Append a plan to the end of the script
    pub fn push(&mut self, plan: BurstPlan) {
        self.plans.push_back(plan);
    }

    /// Plans not yet replayed
    pub fn remaining(&self) -> usize {
        self.plans.len()
    }

    /// Plans replayed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl DispatchDecisions for ScriptedDecisions {
    fn plan(&mut self, _process: &Process, _cpu_fraction: Tick, _device_count: usize) -> BurstPlan {
        match self.plans.pop_front() {
            Some(plan) => {
                self.consumed += 1;
                plan
            }
            None => BurstPlan::Cpu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::process::ProcessSpec;

    #[test]
    fn test_script_replays_in_order() {
        let p = Process::new(ProcessSpec::new("P1", 10, 0));
        let mut script = ScriptedDecisions::new([
            BurstPlan::Cpu,
            BurstPlan::Device {
                request_point: 1,
                device: 2,
            },
        ]);
        script.push(BurstPlan::Cpu);

        assert_eq!(script.remaining(), 3);
        assert_eq!(script.plan(&p, 4, 3), BurstPlan::Cpu);
        assert_eq!(
            script.plan(&p, 4, 3),
            BurstPlan::Device {
                request_point: 1,
                device: 2
            }
        );
        assert_eq!(script.plan(&p, 4, 3), BurstPlan::Cpu);
        assert_eq!(script.consumed(), 3);
        assert_eq!(script.remaining(), 0);
    }

    #[test]
    fn test_exhausted_script_is_cpu_only() {
        let p = Process::new(ProcessSpec::new("P1", 10, 100));
        let mut script = ScriptedDecisions::cpu_only();

        assert_eq!(script.plan(&p, 4, 3), BurstPlan::Cpu);
        assert_eq!(script.consumed(), 0);
    }
}

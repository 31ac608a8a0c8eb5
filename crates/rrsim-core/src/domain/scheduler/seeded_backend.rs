//! Seeded Backend - uniform random draws
//!
//! Per dispatch cycle:
//! 1. roll `r` uniformly in `[1, 100]`; a device is used iff `r <= probability`
//! 2. draw the request point `k` uniformly in `[1, cpu_fraction]`
//! 3. pick the device uniformly from the device table
//!
//! With no devices configured the roll is skipped and the burst is CPU-only.

use super::backend::DispatchDecisions;
use super::types::BurstPlan;
use crate::domain::clock::Tick;
use crate::domain::process::Process;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `rand`-driven dispatch decisions
///
/// # Example
///
/// ```rust
/// use rrsim_core::domain::process::{Process, ProcessSpec};
/// use rrsim_core::domain::scheduler::{BurstPlan, DispatchDecisions, SeededDecisions};
///
/// let always = Process::new(ProcessSpec::new("P1", 10, 100));
/// let never = Process::new(ProcessSpec::new("P2", 10, 0));
/// let mut decisions = SeededDecisions::seeded(7);
///
/// assert!(matches!(decisions.plan(&always, 4, 2), BurstPlan::Device { .. }));
/// assert_eq!(decisions.plan(&never, 4, 2), BurstPlan::Cpu);
/// ```
#[derive(Debug, Clone)]
pub struct SeededDecisions {
    rng: StdRng,
}

impl SeededDecisions {
    /// Reproducible decisions from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Decisions seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded if `seed` is given, entropy otherwise
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl DispatchDecisions for SeededDecisions {
    fn plan(&mut self, process: &Process, cpu_fraction: Tick, device_count: usize) -> BurstPlan {
        if device_count == 0 {
            return BurstPlan::Cpu;
        }

        let roll: u8 = self.rng.gen_range(1..=100);
        if roll > process.device_probability() {
            return BurstPlan::Cpu;
        }

        BurstPlan::Device {
            request_point: self.rng.gen_range(1..=cpu_fraction.max(1)),
            device: self.rng.gen_range(0..device_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::process::ProcessSpec;

    #[test]
    fn test_same_seed_same_plans() {
        let process = Process::new(ProcessSpec::new("P1", 10, 50));
        let mut a = SeededDecisions::seeded(42);
        let mut b = SeededDecisions::seeded(42);

        for _ in 0..100 {
            assert_eq!(a.plan(&process, 5, 3), b.plan(&process, 5, 3));
        }
    }

    #[test]
    fn test_draws_stay_in_range() {
        let process = Process::new(ProcessSpec::new("P1", 10, 100));
        let mut decisions = SeededDecisions::seeded(1);

        for _ in 0..1_000 {
            match decisions.plan(&process, 3, 2) {
                BurstPlan::Device {
                    request_point,
                    device,
                } => {
                    assert!((1..=3).contains(&request_point));
                    assert!(device < 2);
                }
                BurstPlan::Cpu => panic!("probability 100 must always request a device"),
            }
        }
    }

    #[test]
    fn test_probability_extremes() {
        let never = Process::new(ProcessSpec::new("P0", 10, 0));
        let mut decisions = SeededDecisions::seeded(9);

        for _ in 0..1_000 {
            assert_eq!(decisions.plan(&never, 4, 3), BurstPlan::Cpu);
        }
    }

    #[test]
    fn test_no_devices_means_cpu() {
        let process = Process::new(ProcessSpec::new("P1", 10, 100));
        let mut decisions = SeededDecisions::seeded(3);
        assert_eq!(decisions.plan(&process, 4, 0), BurstPlan::Cpu);
    }
}

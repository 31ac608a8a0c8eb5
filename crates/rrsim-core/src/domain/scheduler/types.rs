//! Scheduler Types

use crate::domain::clock::Tick;
use serde::Serialize;
use std::fmt;

/// How the dispatched process spends its CPU slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstPlan {
    /// Consume the whole CPU fraction, no device request
    Cpu,

    /// Consume `request_point - 1` units, then request `device`
    Device {
        /// Draw `k` in `[1, cpu_fraction]`
        request_point: Tick,
        /// Index into the device table
        device: usize,
    },
}

impl BurstPlan {
    /// Bring the plan into range for this system
    ///
    /// - No devices configured: always `Cpu`.
    /// - `request_point` is clamped into `[1, cpu_fraction]`.
    /// - `device` wraps around the device table.
    pub fn normalize(self, cpu_fraction: Tick, device_count: usize) -> Self {
        match self {
            BurstPlan::Cpu => BurstPlan::Cpu,
            BurstPlan::Device { .. } if device_count == 0 => BurstPlan::Cpu,
            BurstPlan::Device {
                request_point,
                device,
            } => BurstPlan::Device {
                request_point: request_point.clamp(1, cpu_fraction.max(1)),
                device: device % device_count,
            },
        }
    }

    /// CPU units to consume before the plan's transition
    #[inline]
    pub fn cpu_budget(self, cpu_fraction: Tick) -> Tick {
        match self {
            BurstPlan::Cpu => cpu_fraction,
            BurstPlan::Device { request_point, .. } => request_point.saturating_sub(1),
        }
    }
}

impl fmt::Display for BurstPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BurstPlan::Cpu => write!(f, "CPU"),
            BurstPlan::Device {
                request_point,
                device,
            } => write!(f, "DEVICE(k={}, dev{})", request_point, device),
        }
    }
}

/// Result of one scheduler step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleControl {
    /// A process was dispatched
    Dispatched,

    /// Nothing to dispatch yet
    Idle,

    /// Ready and blocked are empty and the grace period elapsed
    Terminated,

    /// Global stop flag observed mid-cycle
    Stopped,
}

/// Counters reported when the scheduler exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    /// Completed dispatch cycles
    pub cycles: u64,

    /// Clock units added while nothing was ready
    pub idle_ticks: u64,

    /// Cycles that ended in a device request
    pub device_requests: u64,
}

//! State shared by every worker thread

use super::config::SimConfig;
use crate::domain::clock::{LogicalClock, Tick};
use crate::domain::device::Device;
use crate::domain::state::SchedulerState;
use crate::domain::trace::TraceSink;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Global stop flag
///
/// Raised once, never lowered. Every worker checks it at its loop boundary.
#[derive(Debug, Default)]
pub struct StopSignal(AtomicBool);

impl StopSignal {
    /// Ask every worker to exit
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Check whether the flag was raised
    #[inline]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Everything the workers share
///
/// Lock order: `state`, then a process lock, then a device queue lock.
pub struct SharedSystem {
    pub(crate) state: Mutex<SchedulerState>,
    pub(crate) clock: LogicalClock,
    pub(crate) devices: Vec<Arc<Device>>,
    pub(crate) stop: StopSignal,
    pub(crate) config: SimConfig,
    pub(crate) cpu_fraction: Tick,
    pub(crate) process_count: usize,
    pub(crate) sink: Arc<dyn TraceSink>,
}

impl SharedSystem {
    /// Raise the stop flag and disconnect every device
    pub fn shutdown(&self) {
        self.stop.raise();
        for device in &self.devices {
            device.disconnect();
        }
    }

    /// Simulated clock
    pub fn clock(&self) -> &LogicalClock {
        &self.clock
    }

    /// Device table, in load order
    pub fn devices(&self) -> &[Arc<Device>] {
        &self.devices
    }

    /// Runtime configuration
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Stop flag
    pub fn stop(&self) -> &StopSignal {
        &self.stop
    }
}

impl fmt::Debug for SharedSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSystem")
            .field("clock", &self.clock.read())
            .field("devices", &self.devices.len())
            .field("cpu_fraction", &self.cpu_fraction)
            .field("process_count", &self.process_count)
            .field("stopped", &self.stop.is_raised())
            .finish()
    }
}

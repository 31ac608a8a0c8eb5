//! Process Entity

use super::types::{Pid, ProcessSnapshot, ProcessSpec};
use crate::domain::clock::Tick;
use crate::domain::device::Device;
use crate::domain::error::InvariantViolation;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Which device, if any, is servicing the process
#[derive(Clone, Default)]
pub enum DeviceBinding {
    /// Not blocked on any device
    #[default]
    Idle,

    /// Blocked, queued on or served by the device
    UsingDevice(Arc<Device>),
}

impl DeviceBinding {
    /// Name of the bound device
    pub fn device_name(&self) -> Option<&str> {
        match self {
            DeviceBinding::Idle => None,
            DeviceBinding::UsingDevice(device) => Some(device.name()),
        }
    }

    /// Check whether a device is bound
    #[inline]
    pub fn is_using_device(&self) -> bool {
        matches!(self, DeviceBinding::UsingDevice(_))
    }
}

impl fmt::Debug for DeviceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceBinding::Idle => write!(f, "Idle"),
            DeviceBinding::UsingDevice(device) => write!(f, "UsingDevice({})", device.name()),
        }
    }
}

/// Schedulable unit of work
///
/// # Locking
///
/// The mutable fields sit behind the process's own mutex. `detach_device`
/// holds it while releasing the device slot, so the process lock is always
/// taken before a device lock and never the other way around.
///
/// # Example
///
/// ```rust
/// use rrsim_core::domain::process::{Process, ProcessSpec};
///
/// let process = Process::new(ProcessSpec::new("P1", 5, 0));
///
/// assert_eq!(process.consume_time(3), 3);
/// assert_eq!(process.consume_time(3), 2); // only 2 units were left
/// assert!(process.has_ended());
/// ```
pub struct Process {
    pid: Pid,
    device_probability: u8,
    operating_time: Tick,
    inner: Mutex<ProcessInner>,
}

struct ProcessInner {
    remaining: Tick,
    binding: DeviceBinding,
}

impl Process {
    /// Create a process from its descriptor
    pub fn new(spec: ProcessSpec) -> Self {
        Self {
            pid: spec.pid,
            device_probability: spec.device_probability,
            operating_time: spec.operating_time,
            inner: Mutex::new(ProcessInner {
                remaining: spec.operating_time,
                binding: DeviceBinding::Idle,
            }),
        }
    }

    /// Process identifier
    #[inline]
    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    /// Chance (0-100) of requesting a device per dispatch cycle
    #[inline]
    pub fn device_probability(&self) -> u8 {
        self.device_probability
    }

    /// Operating time the process was loaded with
    #[inline]
    pub fn operating_time(&self) -> Tick {
        self.operating_time
    }

    /// Remaining operating time
    pub fn remaining(&self) -> Tick {
        self.inner.lock().remaining
    }

    /// Consume up to `units` of operating time
    ///
    /// Stops early once the remaining time hits zero and returns the number
    /// of units actually consumed. The caller advances the clock by exactly
    /// that amount.
    pub fn consume_time(&self, units: Tick) -> Tick {
        let mut inner = self.inner.lock();
        let consumed = units.min(inner.remaining);
        inner.remaining -= consumed;
        consumed
    }

    /// Check whether the operating time is exhausted
    pub fn has_ended(&self) -> bool {
        self.inner.lock().remaining == 0
    }

    /// Current device binding
    pub fn binding(&self) -> DeviceBinding {
        self.inner.lock().binding.clone()
    }

    /// Bind the process to the device that will service its request
    ///
    /// # Errors
    /// `AlreadyAttached` if a device is already bound in this block episode.
    pub fn attach_device(&self, device: Arc<Device>) -> Result<(), InvariantViolation> {
        let mut inner = self.inner.lock();
        if let DeviceBinding::UsingDevice(current) = &inner.binding {
            return Err(InvariantViolation::AlreadyAttached {
                pid: self.pid.clone(),
                device: current.name().to_string(),
            });
        }
        inner.binding = DeviceBinding::UsingDevice(device);
        Ok(())
    }

    /// Clear the binding and free the device slot held by the process
    ///
    /// Returns the device that was bound.
    ///
    /// # Errors
    /// - `NotAttached` if no device is bound
    /// - `NotInService` if the device has no slot for this process
    pub fn detach_device(&self) -> Result<Arc<Device>, InvariantViolation> {
        let mut inner = self.inner.lock();
        let device = match std::mem::take(&mut inner.binding) {
            DeviceBinding::UsingDevice(device) => device,
            DeviceBinding::Idle => {
                return Err(InvariantViolation::NotAttached {
                    pid: self.pid.clone(),
                })
            }
        };

        if let Err(err) = device.release(&self.pid) {
            inner.binding = DeviceBinding::UsingDevice(device);
            return Err(err);
        }
        Ok(device)
    }

    /// Consistent view for tracing
    pub fn snapshot(&self) -> ProcessSnapshot {
        let inner = self.inner.lock();
        ProcessSnapshot {
            pid: self.pid.clone(),
            remaining: inner.remaining,
            device: inner.binding.device_name().map(str::to_string),
        }
    }
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Process")
            .field("pid", &self.pid)
            .field("remaining", &inner.remaining)
            .field("device_probability", &self.device_probability)
            .field("binding", &inner.binding)
            .finish()
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}",
            self.pid,
            self.remaining(),
            self.device_probability
        )
    }
}

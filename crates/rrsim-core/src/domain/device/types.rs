//! Device Types

use crate::domain::clock::Tick;
use crate::domain::process::Pid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Device identifier (index in the device table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(pub usize);

impl DeviceId {
    /// Create a new device identifier
    #[inline(always)]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Get the raw index
    #[inline(always)]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dev{}", self.0)
    }
}

/// Already-parsed device descriptor handed over by the input collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSpec {
    /// Device name
    pub name: String,

    /// Maximum number of processes served at once
    pub capacity: usize,

    /// Logical time each serviced request costs
    pub service_time: Tick,
}

impl DeviceSpec {
    /// Create a new descriptor
    pub fn new(name: impl Into<String>, capacity: usize, service_time: Tick) -> Self {
        Self {
            name: name.into(),
            capacity,
            service_time,
        }
    }
}

/// Consistent view of a device queue taken under the device lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSnapshot {
    /// Device name
    pub name: String,

    /// Configured capacity
    pub capacity: usize,

    /// Processes occupying a slot, in admission order
    pub in_service: Vec<Pid>,

    /// Processes waiting for a slot, in request order
    pub pending: Vec<Pid>,
}

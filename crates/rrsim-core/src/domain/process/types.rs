//! Process Types

use crate::domain::clock::Tick;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process identifier
///
/// Opaque and stable for the whole run. The loader takes it verbatim from
/// the input file, so it is textual rather than numeric.
///
/// # Example
///
/// ```rust
/// use rrsim_core::domain::process::Pid;
///
/// let pid = Pid::new("processo-0");
/// assert_eq!(pid.as_str(), "processo-0");
/// assert_eq!(pid.to_string(), "processo-0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(String);

impl Pid {
    /// Create a new process identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Pid {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Already-parsed process descriptor handed over by the input collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    /// Process identifier
    pub pid: Pid,

    /// Total CPU time the process needs
    pub operating_time: Tick,

    /// Chance (0-100) of requesting a device in a dispatch cycle
    pub device_probability: u8,
}

impl ProcessSpec {
    /// Create a new descriptor
    pub fn new(pid: impl Into<String>, operating_time: Tick, device_probability: u8) -> Self {
        Self {
            pid: Pid::new(pid),
            operating_time,
            device_probability,
        }
    }
}

/// Consistent view of a process taken under its own lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessSnapshot {
    /// Process identifier
    pub pid: Pid,

    /// Remaining operating time
    pub remaining: Tick,

    /// Name of the device servicing the process, if blocked
    pub device: Option<String>,
}

//! Workload - the parsed input handed to the builder

use crate::domain::clock::Tick;
use crate::domain::device::DeviceSpec;
use crate::domain::process::ProcessSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Largest accepted operating time or service time
pub const MAX_UNITS: Tick = u32::MAX as Tick;

/// CPU fraction, device table and process table of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    /// Maximum CPU units per dispatch cycle
    pub cpu_fraction: Tick,

    /// Devices, in load order
    pub devices: Vec<DeviceSpec>,

    /// Processes, in load order (initial ready-queue order)
    pub processes: Vec<ProcessSpec>,
}

impl Workload {
    /// Sanity-check the workload
    ///
    /// Rejects a zero CPU fraction, zero device capacity, probabilities above
    /// 100, durations above [`MAX_UNITS`] and duplicate device names or pids.
    /// Returns a human-readable reason.
    pub fn validate(&self) -> Result<(), String> {
        if self.cpu_fraction == 0 {
            return Err("cpu fraction must be at least 1".into());
        }

        let mut names = HashSet::with_capacity(self.devices.len());
        for device in &self.devices {
            if device.capacity == 0 {
                return Err(format!("device `{}` has zero capacity", device.name));
            }
            if device.service_time > MAX_UNITS {
                return Err(format!(
                    "device `{}` has service time {} (max {})",
                    device.name, device.service_time, MAX_UNITS
                ));
            }
            if !names.insert(device.name.as_str()) {
                return Err(format!("duplicate device name `{}`", device.name));
            }
        }

        let mut pids = HashSet::with_capacity(self.processes.len());
        for process in &self.processes {
            if process.device_probability > 100 {
                return Err(format!(
                    "process `{}` has device probability {} (max 100)",
                    process.pid, process.device_probability
                ));
            }
            if process.operating_time > MAX_UNITS {
                return Err(format!(
                    "process `{}` has operating time {} (max {})",
                    process.pid, process.operating_time, MAX_UNITS
                ));
            }
            if !pids.insert(&process.pid) {
                return Err(format!("duplicate pid `{}`", process.pid));
            }
        }

        Ok(())
    }

    /// Sum of every process's operating time
    pub fn total_operating_time(&self) -> Tick {
        self.processes
            .iter()
            .fold(0, |total: Tick, p| total.saturating_add(p.operating_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workload() -> Workload {
        Workload {
            cpu_fraction: 4,
            devices: vec![DeviceSpec::new("disk", 1, 5)],
            processes: vec![ProcessSpec::new("P1", 8, 0), ProcessSpec::new("P2", 3, 50)],
        }
    }

    #[test]
    fn test_valid_workload() {
        let w = workload();
        assert!(w.validate().is_ok());
        assert_eq!(w.total_operating_time(), 11);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut w = workload();
        w.cpu_fraction = 0;
        assert!(w.validate().unwrap_err().contains("cpu fraction"));

        let mut w = workload();
        w.devices[0].capacity = 0;
        assert!(w.validate().unwrap_err().contains("zero capacity"));

        let mut w = workload();
        w.processes[1].device_probability = 101;
        assert!(w.validate().unwrap_err().contains("max 100"));
    }

    #[test]
    fn test_rejects_duplicates() {
        let mut w = workload();
        w.processes.push(ProcessSpec::new("P1", 2, 0));
        assert!(w.validate().unwrap_err().contains("duplicate pid"));

        let mut w = workload();
        w.devices.push(DeviceSpec::new("disk", 2, 1));
        assert!(w.validate().unwrap_err().contains("duplicate device"));
    }

    #[test]
    fn test_rejects_oversized_durations() {
        let mut w = workload();
        w.devices[0].service_time = Tick::MAX;
        assert!(w.validate().unwrap_err().contains("service time"));

        let mut w = workload();
        w.processes[0].operating_time = MAX_UNITS + 1;
        assert!(w.validate().unwrap_err().contains("operating time"));

        let mut w = workload();
        w.devices[0].service_time = MAX_UNITS;
        assert!(w.validate().is_ok());
    }

    #[test]
    fn test_total_operating_time_saturates() {
        let mut w = workload();
        w.processes[0].operating_time = Tick::MAX;
        assert_eq!(w.total_operating_time(), Tick::MAX);
    }
}

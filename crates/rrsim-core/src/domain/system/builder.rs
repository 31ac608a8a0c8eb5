//! Operating System Builder

use super::config::SimConfig;
use super::orchestrator::OperatingSystem;
use super::shared::{SharedSystem, StopSignal};
use super::workload::Workload;
use crate::domain::clock::{LogicalClock, Tick};
use crate::domain::device::{Device, DeviceSpec};
use crate::domain::error::{SimError, SimResult};
use crate::domain::process::{Process, ProcessSpec};
use crate::domain::scheduler::{DispatchDecisions, SeededDecisions};
use crate::domain::state::SchedulerState;
use crate::domain::trace::{NullSink, TraceSink};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

/// Assembles an [`OperatingSystem`]
///
/// # Example
///
/// ```rust
/// use rrsim_core::domain::device::DeviceSpec;
/// use rrsim_core::domain::process::ProcessSpec;
/// use rrsim_core::domain::system::{OperatingSystemBuilder, SimConfig};
///
/// let os = OperatingSystemBuilder::new(4)
///     .device(DeviceSpec::new("disk", 1, 5))
///     .process(ProcessSpec::new("P1", 8, 0))
///     .config(SimConfig::fast())
///     .build()
///     .unwrap();
///
/// let report = os.run().unwrap();
/// assert_eq!(report.completion_of("P1"), Some(8));
/// ```
pub struct OperatingSystemBuilder {
    workload: Workload,
    config: SimConfig,
    decisions: Option<Box<dyn DispatchDecisions>>,
    sink: Option<Arc<dyn TraceSink>>,
}

impl OperatingSystemBuilder {
    /// Start with a CPU fraction and no devices or processes
    pub fn new(cpu_fraction: Tick) -> Self {
        Self::from_workload(Workload {
            cpu_fraction,
            devices: Vec::new(),
            processes: Vec::new(),
        })
    }

    /// Start from a parsed workload
    pub fn from_workload(workload: Workload) -> Self {
        Self {
            workload,
            config: SimConfig::default(),
            decisions: None,
            sink: None,
        }
    }

    /// Add a device at the end of the device table
    pub fn device(mut self, spec: DeviceSpec) -> Self {
        self.workload.devices.push(spec);
        self
    }

    /// Add several devices
    pub fn devices(mut self, specs: impl IntoIterator<Item = DeviceSpec>) -> Self {
        self.workload.devices.extend(specs);
        self
    }

    /// Add a process at the tail of the initial ready queue
    pub fn process(mut self, spec: ProcessSpec) -> Self {
        self.workload.processes.push(spec);
        self
    }

    /// Add several processes
    pub fn processes(mut self, specs: impl IntoIterator<Item = ProcessSpec>) -> Self {
        self.workload.processes.extend(specs);
        self
    }

    /// Replace the runtime configuration
    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    /// Use custom dispatch decisions instead of [`SeededDecisions`]
    pub fn decisions(mut self, decisions: impl DispatchDecisions + 'static) -> Self {
        self.decisions = Some(Box::new(decisions));
        self
    }

    /// Report cycles, unblocks and the final report to `sink`
    pub fn trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Validate the workload and create the shared system
    ///
    /// # Errors
    /// `SimError::InvalidWorkload` if [`Workload::validate`] rejects it.
    pub fn build(self) -> SimResult<OperatingSystem> {
        let Self {
            workload,
            config,
            decisions,
            sink,
        } = self;
        workload.validate().map_err(SimError::InvalidWorkload)?;

        if workload.devices.is_empty() && workload.processes.iter().any(|p| p.device_probability > 0) {
            warn!("no devices configured, device requests will be treated as CPU-only bursts");
        }

        let decisions = decisions.unwrap_or_else(|| Box::new(SeededDecisions::new(config.seed)));
        let devices: Vec<Arc<Device>> = workload
            .devices
            .into_iter()
            .enumerate()
            .map(|(id, spec)| Arc::new(Device::new(id, spec)))
            .collect();
        let processes: Vec<Arc<Process>> = workload
            .processes
            .into_iter()
            .map(|spec| Arc::new(Process::new(spec)))
            .collect();

        let system = SharedSystem {
            process_count: processes.len(),
            state: Mutex::new(SchedulerState::new(processes)),
            clock: LogicalClock::new(),
            devices,
            stop: StopSignal::default(),
            config,
            cpu_fraction: workload.cpu_fraction,
            sink: sink.unwrap_or_else(|| Arc::new(NullSink)),
        };

        Ok(OperatingSystem::new(Arc::new(system), decisions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_assigns_device_ids_in_order() {
        let os = OperatingSystemBuilder::new(3)
            .devices([DeviceSpec::new("a", 1, 1), DeviceSpec::new("b", 2, 2)])
            .processes([ProcessSpec::new("P1", 1, 0)])
            .build()
            .unwrap();

        let shared = os.shared();
        assert_eq!(shared.devices()[1].name(), "b");
        assert_eq!(shared.devices()[1].id().as_usize(), 1);
        assert_eq!(shared.state.lock().ready_len(), 1);
    }

    #[test]
    fn test_build_rejects_invalid_workload() {
        let err = OperatingSystemBuilder::new(0).build().unwrap_err();
        assert!(matches!(err, SimError::InvalidWorkload(_)));
    }

    #[test]
    fn test_build_rejects_unbounded_service_time() {
        let err = OperatingSystemBuilder::new(3)
            .device(DeviceSpec::new("D1", 1, u64::MAX))
            .process(ProcessSpec::new("P1", 10, 100))
            .build()
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidWorkload(reason) if reason.contains("service time")));
    }
}

//! Operating System Orchestrator
//!
//! Owns the shared system and spawns one named thread per worker:
//!
//! ```text
//! device-<name> × N   Device::run
//! watcher             BlockedProcessWatcher::run
//! scheduler           Scheduler::run
//! ```
//!
//! A worker that returns an error or panics raises the stop flag, so the
//! others wind down and `run` returns the first failure after joining all.

use super::builder::OperatingSystemBuilder;
use super::report::{DeviceStats, SimulationReport};
use super::shared::SharedSystem;
use crate::domain::clock::{LogicalClock, Tick};
use crate::domain::error::{SimError, SimResult};
use crate::domain::scheduler::{DispatchDecisions, Scheduler, SchedulerStats};
use crate::domain::trace::SystemSnapshot;
use crate::domain::watcher::BlockedProcessWatcher;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info};

/// What a worker hands back when it exits cleanly
#[derive(Debug)]
enum WorkerExit {
    Device,
    Watcher { unblocks: u64 },
    Scheduler(SchedulerStats),
}

/// Raises the stop flag if the owning thread unwinds
struct PanicGuard<'a>(&'a SharedSystem);

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.shutdown();
        }
    }
}

type Worker = (String, JoinHandle<SimResult<WorkerExit>>);

/// The simulated operating system
pub struct OperatingSystem {
    system: Arc<SharedSystem>,
    decisions: Box<dyn DispatchDecisions>,
}

impl fmt::Debug for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatingSystem")
            .field("system", &self.system)
            .finish_non_exhaustive()
    }
}

impl OperatingSystem {
    pub(crate) fn new(system: Arc<SharedSystem>, decisions: Box<dyn DispatchDecisions>) -> Self {
        Self { system, decisions }
    }

    /// Shortcut for [`OperatingSystemBuilder::new`]
    pub fn builder(cpu_fraction: Tick) -> OperatingSystemBuilder {
        OperatingSystemBuilder::new(cpu_fraction)
    }

    /// Simulated clock
    pub fn clock(&self) -> &LogicalClock {
        self.system.clock()
    }

    /// Current state of every set and device queue
    pub fn snapshot(&self) -> SystemSnapshot {
        self.system.state.lock().snapshot(&self.system.devices)
    }

    pub(crate) fn shared(&self) -> Arc<SharedSystem> {
        Arc::clone(&self.system)
    }

    /// Run every worker to completion
    ///
    /// # Errors
    /// The first worker error, `SimError::WorkerPanicked` for a panicking
    /// worker, or an invariant violation found by the final partition check.
    pub fn run(self) -> SimResult<SimulationReport> {
        let Self { system, decisions } = self;
        info!(
            processes = system.process_count,
            devices = system.devices.len(),
            cpu_fraction = system.cpu_fraction,
            "simulation started"
        );

        let workers = spawn_workers(&system, decisions)?;
        let mut first_error = None;
        let mut stats = SchedulerStats::default();
        let mut unblocks = 0;

        for (name, handle) in workers {
            match handle.join() {
                Ok(Ok(WorkerExit::Scheduler(s))) => stats = s,
                Ok(Ok(WorkerExit::Watcher { unblocks: n })) => unblocks = n,
                Ok(Ok(WorkerExit::Device)) => {}
                Ok(Err(err)) => {
                    first_error.get_or_insert(err);
                }
                Err(_) => {
                    error!(worker = %name, "worker panicked");
                    first_error.get_or_insert(SimError::WorkerPanicked { worker: name });
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        let report = {
            let state = system.state.lock();
            state.check_partition(system.process_count)?;
            SimulationReport {
                completions: state.finished().to_vec(),
                final_clock: system.clock.read(),
                dispatch_cycles: stats.cycles,
                idle_ticks: stats.idle_ticks,
                unblocks,
                devices: system
                    .devices
                    .iter()
                    .map(|d| DeviceStats {
                        name: d.name().to_string(),
                        capacity: d.capacity(),
                        peak_in_service: d.peak_in_service(),
                        admissions: d.admissions(),
                    })
                    .collect(),
            }
        };

        info!(
            finished = report.completions.len(),
            final_clock = report.final_clock,
            cycles = report.dispatch_cycles,
            "simulation finished"
        );
        system.sink.on_finish(&report);
        Ok(report)
    }
}

fn spawn_workers(system: &Arc<SharedSystem>, decisions: Box<dyn DispatchDecisions>) -> SimResult<Vec<Worker>> {
    let mut workers = Vec::with_capacity(system.devices.len() + 2);

    if let Err(err) = spawn_into(&mut workers, system, decisions) {
        system.shutdown();
        for (_, handle) in workers {
            let _ = handle.join();
        }
        return Err(err);
    }
    Ok(workers)
}

fn spawn_into(
    workers: &mut Vec<Worker>,
    system: &Arc<SharedSystem>,
    decisions: Box<dyn DispatchDecisions>,
) -> SimResult<()> {
    for device in &system.devices {
        let device = Arc::clone(device);
        let shared = Arc::clone(system);
        workers.push(spawn_worker(system, format!("device-{}", device.name()), move || {
            device.run(&shared).map(|()| WorkerExit::Device)
        })?);
    }

    let watcher = BlockedProcessWatcher::new(Arc::clone(system));
    workers.push(spawn_worker(system, "watcher".into(), move || {
        watcher.run().map(|unblocks| WorkerExit::Watcher { unblocks })
    })?);

    let scheduler = Scheduler::new(Arc::clone(system), decisions);
    workers.push(spawn_worker(system, "scheduler".into(), move || {
        scheduler.run().map(WorkerExit::Scheduler)
    })?);
    Ok(())
}

fn spawn_worker<F>(system: &Arc<SharedSystem>, name: String, body: F) -> SimResult<Worker>
where
    F: FnOnce() -> SimResult<WorkerExit> + Send + 'static,
{
    let shared = Arc::clone(system);
    let handle = thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            let _guard = PanicGuard(&shared);
            let result = body();
            if let Err(err) = &result {
                error!(error = %err, "worker failed, stopping simulation");
                shared.shutdown();
            }
            result
        })
        .map_err(|source| SimError::Spawn {
            worker: name.clone(),
            source,
        })?;
    Ok((name, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::process::{Process, ProcessSpec};
    use crate::domain::scheduler::BurstPlan;
    use crate::domain::system::SimConfig;

    #[test]
    fn test_empty_workload_terminates() {
        let report = OperatingSystem::builder(4)
            .config(SimConfig::fast())
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert!(report.completions.is_empty());
        assert_eq!(report.final_clock, 0);
        assert_eq!(report.dispatch_cycles, 0);
    }

    #[test]
    fn test_panicking_decisions_surface_as_worker_panic() {
        let os = OperatingSystem::builder(4)
            .process(ProcessSpec::new("P1", 4, 0))
            .config(SimConfig::fast())
            .decisions(|_: &Process, _: Tick, _: usize| -> BurstPlan { panic!("decision source failed") })
            .build()
            .unwrap();

        let err = os.run().unwrap_err();
        assert!(matches!(err, SimError::WorkerPanicked { ref worker } if worker == "scheduler"));
    }

    #[test]
    fn test_snapshot_before_run() {
        let os = OperatingSystem::builder(2)
            .process(ProcessSpec::new("P1", 4, 0))
            .process(ProcessSpec::new("P2", 4, 0))
            .build()
            .unwrap();

        let snapshot = os.snapshot();
        assert_eq!(snapshot.ready.len(), 2);
        assert_eq!(os.clock().read(), 0);
    }
}

//! Domain Layer - the concurrent simulation core
//!
//! Pure simulation logic: no file, terminal or environment access. Inputs
//! arrive as [`system::Workload`], outputs leave through [`trace::TraceSink`]
//! and [`system::SimulationReport`].

pub mod clock;
pub mod device;
pub mod error;
pub mod process;
pub mod scheduler;
pub mod state;
pub mod system;
pub mod trace;
pub mod watcher;

pub use clock::{LogicalClock, Tick};
pub use device::{Device, DeviceSpec};
pub use error::{InvariantViolation, SimError, SimResult};
pub use process::{Pid, Process, ProcessSpec};
pub use scheduler::{BurstPlan, DispatchDecisions, Scheduler, ScriptedDecisions, SeededDecisions};
pub use state::SchedulerState;
pub use system::{OperatingSystem, OperatingSystemBuilder, SimConfig, SimulationReport, Workload};
pub use trace::{BurstOutcome, CycleTrace, NullSink, SystemSnapshot, TraceSink};
pub use watcher::BlockedProcessWatcher;

//! System Module - wiring the workers together
//!
//! # Overview
//!
//! ```text
//! OperatingSystemBuilder ──build()──► OperatingSystem ──run()──► SimulationReport
//!                                          │
//!                                          ├─ device worker × N  (Device::run)
//!                                          ├─ watcher            (BlockedProcessWatcher::run)
//!                                          └─ scheduler          (Scheduler::run)
//! ```
//!
//! Every worker shares one [`SharedSystem`]: the state mutex, the clock,
//! the device table, the stop flag, the runtime configuration and the
//! trace sink.

mod builder;
mod config;
mod orchestrator;
mod report;
mod shared;
mod workload;

pub use builder::OperatingSystemBuilder;
pub use config::SimConfig;
pub use orchestrator::OperatingSystem;
pub use report::{Completion, DeviceStats, SimulationReport};
pub use shared::{SharedSystem, StopSignal};
pub use workload::{Workload, MAX_UNITS};

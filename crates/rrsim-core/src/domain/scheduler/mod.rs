//! Scheduler Module - Round-Robin Dispatch
//!
//! # Overview
//!
//! The scheduler is the only worker that consumes CPU time and advances the
//! clock. Each dispatch cycle pops the head of the ready queue, asks a
//! [`DispatchDecisions`] backend for a [`BurstPlan`], runs the burst and
//! moves the process to `ready`, `blocked` or `finished`.
//!
//! ```text
//! Scheduler
//!   ├─ system:    Arc<SharedSystem>          (state, clock, devices, stop flag)
//!   ├─ decisions: Box<dyn DispatchDecisions> (Seeded or Scripted)
//!   └─ stats:     SchedulerStats
//! ```
//!
//! # Module Structure
//!
//! ```text
//! domain/scheduler/
//! ├── types.rs            BurstPlan, CycleControl, SchedulerStats
//! ├── backend.rs          DispatchDecisions trait
//! ├── seeded_backend.rs   rand-driven draws (optionally seeded)
//! ├── scripted_backend.rs replayed plans for deterministic runs
//! └── engine.rs           Scheduler dispatch loop
//! ```
//!
//! # Clock discipline
//!
//! The clock moves one unit at a time. After every unit the scheduler waits
//! until the system is settled: no countdown is due and no device has a
//! queued request with a free slot. The watcher and the device workers do
//! that work concurrently; the scheduler only refuses to run ahead of them,
//! which makes completion times a function of the dispatch decisions alone.

pub mod backend;
pub mod engine;
pub mod scripted_backend;
pub mod seeded_backend;
pub mod types;

pub use backend::DispatchDecisions;
pub use engine::Scheduler;
pub use scripted_backend::ScriptedDecisions;
pub use seeded_backend::SeededDecisions;
pub use types::{BurstPlan, CycleControl, SchedulerStats};

//! Device Module
//!
//! A device services blocked processes with bounded concurrency. Each device
//! runs its own worker thread that drains the FIFO request queue whenever a
//! capacity slot is free.
//!
//! # Per-request lifecycle
//!
//! ```text
//!   enqueue()          admit (slot free)            release() (watcher unblocks)
//! ───────────> QUEUED ─────────────────> IN SERVICE ────────────────────────────> RELEASED
//!               │                          │
//!               └─ blocked, no countdown   └─ blocked, unblock_at = admit clock + service_time
//! ```
//!
//! # Invariants
//! - `in_service.len() <= capacity` at all times.
//! - Admission and the start of the blocked countdown happen in one critical
//!   section under the scheduler-state lock, so a process never holds a slot
//!   without a countdown or counts down without a slot.
//! - Lock order: scheduler state, then process, then device.

mod engine;
mod types;

pub use engine::Device;
pub use types::{DeviceId, DeviceSnapshot, DeviceSpec};

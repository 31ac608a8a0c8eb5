//! Logical Clock Module
//!
//! # Overview
//!
//! The simulation runs on a single discrete counter shared by every worker.
//! The scheduler advances it by the units a process actually consumed (or by
//! one idle tick), the blocked-process watcher compares it against unblock
//! times, and device admission reads it to start a countdown.
//!
//! ```text
//! Scheduler ──tick()──────┐
//!                         ▼
//!                 ┌───────────────┐
//!                 │ LogicalClock  │  RwLock<{ now, last_update }>
//!                 └───────────────┘
//!                  ▲             ▲
//!   Watcher ──read()┘             └──read() Device admission
//! ```
//!
//! # Invariants
//! - The counter never decreases.
//! - Every unit of an `advance(n)` is applied under the write lock, so
//!   concurrent advances never lose an increment and readers never observe a
//!   torn value.
//! - `last_update` is wall-clock time. It only feeds idleness detection and
//!   never influences simulated time.

mod engine;
mod types;

pub use engine::LogicalClock;
pub use types::{ClockReading, Tick};

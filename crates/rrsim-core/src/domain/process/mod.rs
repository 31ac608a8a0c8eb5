//! Process Module
//!
//! A process is one schedulable unit of work. It is shared (`Arc<Process>`)
//! between the ready queue, the blocked map and a device queue, but lives in
//! exactly one membership set at any instant.
//!
//! # State Transitions
//!
//! ```text
//!            dispatch                 request device
//!  READY ──────────────> RUNNING ─────────────────────> BLOCKED
//!    ▲                     │  │                            │
//!    │   slice exhausted   │  │ remaining == 0             │ unblock time reached
//!    └─────────────────────┘  └──────────> FINISHED        │
//!    ▲                                                     │
//!    └─────────────────────────────────────────────────────┘
//! ```
//!
//! The device binding (`DeviceBinding::UsingDevice`) is set when the process
//! enters BLOCKED and cleared when it leaves, so "has a device" and "is
//! blocked" always agree.

mod entity;
mod types;

pub use entity::{DeviceBinding, Process};
pub use types::{Pid, ProcessSnapshot, ProcessSpec};

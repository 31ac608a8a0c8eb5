//! Adapters Layer - the output side of the simulation
//!
//! # Ports & Adapters
//! - Port: [`TraceSink`](crate::domain::trace::TraceSink), implemented here
//!   by `LogSink`, `TextSink` and `RecordingSink`
//! - Report rendering: plain text and JSON

pub mod report;
pub mod trace;

pub use crate::domain::trace::NullSink;
pub use report::{render_report, report_to_json, write_report};
pub use trace::{LogSink, RecordingSink, TextSink, CYCLE_SEPARATOR};

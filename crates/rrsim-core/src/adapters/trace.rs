//! Trace Sinks
//!
//! | Sink            | Output                                   |
//! |-----------------|------------------------------------------|
//! | `NullSink`      | nothing                                  |
//! | `LogSink`       | `tracing` events                         |
//! | `TextSink<W>`   | human-readable cycle blocks on a writer  |
//! | `RecordingSink` | in-memory copies, for assertions         |

use crate::domain::clock::Tick;
use crate::domain::process::Pid;
use crate::domain::system::SimulationReport;
use crate::domain::trace::{BurstOutcome, CycleTrace, SystemSnapshot, TraceSink};
use parking_lot::Mutex;
use std::fmt::Write as _;
use std::io::Write;
use tracing::{debug, info, warn};

/// Line printed after every cycle block
pub const CYCLE_SEPARATOR: &str = "==================================================";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LogSink
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Emits each event through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn on_cycle(&self, trace: &CycleTrace) {
        debug!(
            cycle = trace.cycle,
            pid = %trace.pid,
            clock_before = trace.clock_before,
            clock_after = trace.clock_after,
            outcome = ?trace.outcome,
            ready = trace.snapshot.ready.len(),
            blocked = trace.snapshot.blocked.len(),
            "cycle"
        );
    }

    fn on_unblock(&self, pid: &Pid, clock: Tick) {
        debug!(pid = %pid, clock, "unblock");
    }

    fn on_finish(&self, report: &SimulationReport) {
        for completion in &report.completions {
            info!(pid = %completion.pid, completed_at = completion.completed_at, "completion");
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TextSink
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Writes one human-readable block per dispatch cycle
///
/// ```text
/// CPU Clock: 0 u.t.
///
/// Running process P1
/// Remaining time: 10 u.t.
/// Outcome: device request to D1 after 1 u.t., unblocking time: 6
///
/// CPU Clock: 1 u.t.
///
/// Ready processes:
///  - None
///
/// Blocked processes:
///  - P1, Remaining time: 9 u.t., Unblocking time: 6, Device in use: D1
///
/// Devices:
///  - D1, Requests: 1/1
/// ==================================================
/// ```
pub struct TextSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> TextSink<W> {
    /// Sink writing cycle blocks to `writer`
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn emit(&self, text: &str) {
        let mut writer = self.writer.lock();
        if let Err(err) = writer.write_all(text.as_bytes()).and_then(|()| writer.flush()) {
            warn!(error = %err, "trace output failed");
        }
    }
}

impl<W: Write + Send> TraceSink for TextSink<W> {
    fn on_cycle(&self, trace: &CycleTrace) {
        self.emit(&format_cycle(trace));
    }

    fn on_unblock(&self, pid: &Pid, clock: Tick) {
        self.emit(&format!("{} unblocked at {} u.t.\n", pid, clock));
    }

    fn on_finish(&self, _report: &SimulationReport) {
        self.emit(&format!("{}\n", CYCLE_SEPARATOR));
    }
}

/// Render one cycle block, separator included
pub fn format_cycle(trace: &CycleTrace) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "CPU Clock: {} u.t.", trace.clock_before);
    let _ = writeln!(out, "\nRunning process {}", trace.pid);
    let _ = writeln!(out, "Remaining time: {} u.t.", trace.remaining_before);
    let _ = writeln!(out, "Outcome: {}", describe_outcome(&trace.outcome));
    let _ = writeln!(out, "\nCPU Clock: {} u.t.", trace.clock_after);
    write_snapshot(&mut out, &trace.snapshot);
    let _ = writeln!(out, "{}", CYCLE_SEPARATOR);
    out
}

fn describe_outcome(outcome: &BurstOutcome) -> String {
    match outcome {
        BurstOutcome::Cpu { consumed } => format!("ran {} u.t., back to ready", consumed),
        BurstOutcome::Finished { consumed } => format!("ran {} u.t., finished", consumed),
        BurstOutcome::Blocked {
            consumed,
            device,
            unblock_at,
        } => match unblock_at {
            Some(t) => format!(
                "device request to {} after {} u.t., unblocking time: {}",
                device, consumed, t
            ),
            None => format!("device request to {} after {} u.t., queued", device, consumed),
        },
    }
}

fn write_snapshot(out: &mut String, snapshot: &SystemSnapshot) {
    let _ = writeln!(out, "\nReady processes:");
    if snapshot.ready.is_empty() {
        let _ = writeln!(out, " - None");
    }
    for p in &snapshot.ready {
        let _ = writeln!(out, " - {}, Remaining time: {} u.t.", p.pid, p.remaining);
    }

    let _ = writeln!(out, "\nBlocked processes:");
    if snapshot.blocked.is_empty() {
        let _ = writeln!(out, " - None");
    }
    for b in &snapshot.blocked {
        let unblock = b.unblock_at.map_or_else(|| "waiting".to_string(), |t| t.to_string());
        let _ = writeln!(
            out,
            " - {}, Remaining time: {} u.t., Unblocking time: {}, Device in use: {}",
            b.process.pid, b.process.remaining, unblock, b.device
        );
    }

    let _ = writeln!(out, "\nDevices:");
    for d in &snapshot.devices {
        let _ = writeln!(out, " - {}, Requests: {}/{}", d.name, d.in_service.len(), d.capacity);
        for pid in &d.pending {
            let _ = writeln!(out, "    - {}, queued", pid);
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RecordingSink
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Keeps a copy of every event
#[derive(Debug, Default)]
pub struct RecordingSink {
    cycles: Mutex<Vec<CycleTrace>>,
    unblocks: Mutex<Vec<(Pid, Tick)>>,
    report: Mutex<Option<SimulationReport>>,
}

impl RecordingSink {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded cycles, in order
    pub fn cycles(&self) -> Vec<CycleTrace> {
        self.cycles.lock().clone()
    }

    /// Recorded unblocks, in order
    pub fn unblocks(&self) -> Vec<(Pid, Tick)> {
        self.unblocks.lock().clone()
    }

    /// Final report, once the run finished
    pub fn report(&self) -> Option<SimulationReport> {
        self.report.lock().clone()
    }
}

impl TraceSink for RecordingSink {
    fn on_cycle(&self, trace: &CycleTrace) {
        self.cycles.lock().push(trace.clone());
    }

    fn on_unblock(&self, pid: &Pid, clock: Tick) {
        self.unblocks.lock().push((pid.clone(), clock));
    }

    fn on_finish(&self, report: &SimulationReport) {
        *self.report.lock() = Some(report.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::device::DeviceSnapshot;
    use crate::domain::process::ProcessSnapshot;
    use crate::domain::trace::BlockedSnapshot;

    fn blocked_cycle() -> CycleTrace {
        CycleTrace {
            cycle: 1,
            clock_before: 0,
            clock_after: 1,
            pid: Pid::new("P1"),
            remaining_before: 10,
            outcome: BurstOutcome::Blocked {
                consumed: 1,
                device: "D1".into(),
                unblock_at: Some(6),
            },
            snapshot: SystemSnapshot {
                blocked: vec![BlockedSnapshot {
                    process: ProcessSnapshot {
                        pid: Pid::new("P1"),
                        remaining: 9,
                        device: Some("D1".into()),
                    },
                    device: "D1".into(),
                    unblock_at: Some(6),
                }],
                devices: vec![DeviceSnapshot {
                    name: "D1".into(),
                    capacity: 1,
                    in_service: vec![Pid::new("P1")],
                    pending: vec![],
                }],
                ..SystemSnapshot::default()
            },
        }
    }

    #[test]
    fn test_format_cycle_block() {
        let text = format_cycle(&blocked_cycle());

        assert!(text.starts_with("CPU Clock: 0 u.t.\n"));
        assert!(text.contains("Running process P1\nRemaining time: 10 u.t."));
        assert!(text.contains("unblocking time: 6"));
        assert!(text.contains("CPU Clock: 1 u.t."));
        assert!(text.contains("Ready processes:\n - None"));
        assert!(text.contains(" - P1, Remaining time: 9 u.t., Unblocking time: 6, Device in use: D1"));
        assert!(text.contains(" - D1, Requests: 1/1"));
        assert!(text.ends_with(&format!("{}\n", CYCLE_SEPARATOR)));
    }

    #[test]
    fn test_text_sink_writes_to_buffer() {
        let sink = TextSink::new(Vec::new());
        sink.on_cycle(&blocked_cycle());
        sink.on_unblock(&Pid::new("P1"), 6);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.contains("P1 unblocked at 6 u.t."));
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.on_unblock(&Pid::new("P2"), 3);
        sink.on_unblock(&Pid::new("P1"), 4);
        sink.on_cycle(&blocked_cycle());

        assert_eq!(sink.unblocks(), vec![(Pid::new("P2"), 3), (Pid::new("P1"), 4)]);
        assert_eq!(sink.cycles().len(), 1);
        assert!(sink.report().is_none());
    }
}

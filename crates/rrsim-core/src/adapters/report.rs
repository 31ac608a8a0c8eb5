//! Report Rendering

use crate::domain::system::SimulationReport;
use std::fmt::Write as _;
use std::io;
use std::path::Path;

/// One `"<pid> finished at <t> u.t."` line per completion, in completion order
///
/// # Example
///
/// ```rust
/// use rrsim_core::adapters::render_report;
/// use rrsim_core::domain::process::ProcessSpec;
/// use rrsim_core::domain::system::{OperatingSystemBuilder, SimConfig};
///
/// let report = OperatingSystemBuilder::new(4)
///     .process(ProcessSpec::new("P1", 8, 0))
///     .config(SimConfig::fast())
///     .build()
///     .unwrap()
///     .run()
///     .unwrap();
///
/// assert_eq!(render_report(&report), "P1 finished at 8 u.t.\n");
/// ```
pub fn render_report(report: &SimulationReport) -> String {
    let mut out = String::new();
    for completion in &report.completions {
        let _ = writeln!(out, "{} finished at {} u.t.", completion.pid, completion.completed_at);
    }
    out
}

/// Pretty-printed JSON form of the report
pub fn report_to_json(report: &SimulationReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Write the rendered report to `path`
pub fn write_report(path: impl AsRef<Path>, report: &SimulationReport) -> io::Result<()> {
    std::fs::write(path, render_report(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::process::Pid;
    use crate::domain::system::{Completion, DeviceStats};

    fn report() -> SimulationReport {
        SimulationReport {
            completions: vec![
                Completion {
                    pid: Pid::new("P2"),
                    completed_at: 4,
                },
                Completion {
                    pid: Pid::new("P1"),
                    completed_at: 15,
                },
            ],
            final_clock: 15,
            dispatch_cycles: 6,
            idle_ticks: 5,
            unblocks: 1,
            devices: vec![DeviceStats {
                name: "D1".into(),
                capacity: 1,
                peak_in_service: 1,
                admissions: 1,
            }],
        }
    }

    #[test]
    fn test_render_in_completion_order() {
        assert_eq!(render_report(&report()), "P2 finished at 4 u.t.\nP1 finished at 15 u.t.\n");
    }

    #[test]
    fn test_json_fields() {
        let json = report_to_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["final_clock"], 15);
        assert_eq!(value["completions"][1]["pid"], "P1");
        assert_eq!(value["completions"][1]["completed_at"], 15);
        assert_eq!(value["devices"][0]["peak_in_service"], 1);
    }
}

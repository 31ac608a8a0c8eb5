//! Workload Loader
//!
//! # Format
//!
//! One record per line, fields separated by `|`, blank lines ignored:
//!
//! ```text
//! <cpu_fraction>|<device_count>
//! <device_name>|<capacity>|<service_time>       × device_count
//! <pid>|<operating_time>|<device_probability>   × remaining lines
//! ```
//!
//! # Example
//!
//! ```rust
//! use rrsim_core::infrastructure::parse_workload;
//!
//! let workload = parse_workload("10|1\ndevice-0|1|3\nprocesso-0|4|32\n").unwrap();
//! assert_eq!(workload.cpu_fraction, 10);
//! assert_eq!(workload.devices[0].service_time, 3);
//! assert_eq!(workload.processes[0].pid.as_str(), "processo-0");
//! ```

use crate::domain::device::DeviceSpec;
use crate::domain::process::ProcessSpec;
use crate::domain::system::Workload;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Workload file errors; line numbers are 1-based
#[derive(Debug, Error)]
pub enum LoadError {
    /// Workload file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No non-blank line at all
    #[error("missing header line `<cpu_fraction>|<device_count>`")]
    MissingHeader,

    /// Wrong number of fields on a line
    #[error("line {line}: expected {expected} `|`-separated fields, found {found}")]
    MalformedLine {
        /// Line number
        line: usize,
        /// Fields required for this record
        expected: usize,
        /// Fields present
        found: usize,
    },

    /// A name or pid field is blank
    #[error("line {line}: {field} is empty")]
    EmptyField {
        /// Line number
        line: usize,
        /// Field label
        field: &'static str,
    },

    /// A numeric field does not parse
    #[error("line {line}: invalid {field} `{value}`")]
    InvalidNumber {
        /// Line number
        line: usize,
        /// Field label
        field: &'static str,
        /// Raw text
        value: String,
    },

    /// Input ended before the announced device lines
    #[error("expected {expected} device lines, found {found}")]
    MissingDevices {
        /// Device count from the header
        expected: usize,
        /// Device lines read
        found: usize,
    },

    /// Parsed workload failed [`Workload::validate`]
    #[error("invalid workload: {0}")]
    Workload(String),
}

/// Read and parse a workload file
pub fn load_workload(path: impl AsRef<Path>) -> Result<Workload, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let workload = parse_workload(&text)?;
    debug!(
        path = %path.display(),
        devices = workload.devices.len(),
        processes = workload.processes.len(),
        "workload loaded"
    );
    Ok(workload)
}

/// Parse workload text and validate the result
pub fn parse_workload(text: &str) -> Result<Workload, LoadError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (line, header) = lines.next().ok_or(LoadError::MissingHeader)?;
    let [cpu_fraction, device_count] = fields::<2>(line, header)?;
    let cpu_fraction = number(line, "cpu fraction", cpu_fraction)?;
    let device_count: usize = number(line, "device count", device_count)?;

    let mut devices = Vec::new();
    while devices.len() < device_count {
        let Some((line, record)) = lines.next() else {
            return Err(LoadError::MissingDevices {
                expected: device_count,
                found: devices.len(),
            });
        };
        let [name, capacity, service_time] = fields::<3>(line, record)?;
        devices.push(DeviceSpec::new(
            non_empty(line, "device name", name)?,
            number(line, "device capacity", capacity)?,
            number(line, "service time", service_time)?,
        ));
    }

    let processes = lines
        .map(|(line, record)| -> Result<ProcessSpec, LoadError> {
            let [pid, operating_time, probability] = fields::<3>(line, record)?;
            Ok(ProcessSpec::new(
                non_empty(line, "pid", pid)?,
                number(line, "operating time", operating_time)?,
                number(line, "device probability", probability)?,
            ))
        })
        .collect::<Result<Vec<_>, LoadError>>()?;

    let workload = Workload {
        cpu_fraction,
        devices,
        processes,
    };
    workload.validate().map_err(LoadError::Workload)?;
    Ok(workload)
}

fn fields<const N: usize>(line: usize, record: &str) -> Result<[&str; N], LoadError> {
    let parts: Vec<&str> = record.split('|').map(str::trim).collect();
    let found = parts.len();
    parts.try_into().map_err(|_| LoadError::MalformedLine {
        line,
        expected: N,
        found,
    })
}

fn number<T: FromStr>(line: usize, field: &'static str, value: &str) -> Result<T, LoadError> {
    value.parse().map_err(|_| LoadError::InvalidNumber {
        line,
        field,
        value: value.to_string(),
    })
}

fn non_empty<'a>(line: usize, field: &'static str, value: &'a str) -> Result<&'a str, LoadError> {
    if value.is_empty() {
        return Err(LoadError::EmptyField { line, field });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
10|4
device-0|1|3
device-1|2|5
device-2|2|2
device-3|1|6
processo-0|4|32
processo-1|24|12
processo-2|32|88
processo-3|16|23
processo-4|4|50
";

    #[test]
    fn test_parse_sample() {
        let workload = parse_workload(SAMPLE).unwrap();
        assert_eq!(workload.cpu_fraction, 10);
        assert_eq!(workload.devices.len(), 4);
        assert_eq!(workload.devices[1], DeviceSpec::new("device-1", 2, 5));
        assert_eq!(workload.processes.len(), 5);
        assert_eq!(workload.processes[2], ProcessSpec::new("processo-2", 32, 88));
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let workload = parse_workload("\r\n4|0\r\n\r\nP1|8|0\r\n\n").unwrap();
        assert!(workload.devices.is_empty());
        assert_eq!(workload.processes, vec![ProcessSpec::new("P1", 8, 0)]);
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(parse_workload("\n \n"), Err(LoadError::MissingHeader)));
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let err = parse_workload("4|1\ndisk|1\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::MalformedLine {
                line: 2,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_invalid_number() {
        let err = parse_workload("4|0\nP1|eight|0\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidNumber {
                line: 2,
                field: "operating time",
                ..
            }
        ));
        assert_eq!(err.to_string(), "line 2: invalid operating time `eight`");
    }

    #[test]
    fn test_missing_devices() {
        let err = parse_workload("4|2\ndisk|1|3\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingDevices { expected: 2, found: 1 }));
    }

    #[test]
    fn test_oversized_device_count() {
        let err = parse_workload("4|18446744073709551615\nP1|8|0\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingDevices {
                expected: usize::MAX,
                found: 1
            }
        ));

        let err = parse_workload("4|1000000000\ndisk|1|3\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingDevices {
                expected: 1_000_000_000,
                found: 1
            }
        ));
    }

    #[test]
    fn test_validation_failure() {
        let err = parse_workload("4|0\nP1|8|150\n").unwrap_err();
        assert!(matches!(err, LoadError::Workload(_)));
    }

    #[test]
    fn test_empty_pid() {
        let err = parse_workload("4|0\n|8|10\n").unwrap_err();
        assert!(matches!(err, LoadError::EmptyField { line: 2, field: "pid" }));
    }
}

//! Loader Tests - workload files on disk

use rrsim_core::domain::system::{OperatingSystemBuilder, SimConfig};
use rrsim_core::infrastructure::{load_config, load_workload, LoadError};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_and_run_file() {
    let file = write_temp("4|1\ndisk|1|2\n\nP1|8|0\nP2|4|0\n");
    let workload = load_workload(file.path()).unwrap();
    assert_eq!(workload.processes.len(), 2);

    let report = OperatingSystemBuilder::from_workload(workload)
        .config(SimConfig::fast())
        .build()
        .unwrap()
        .run()
        .unwrap();

    // P1:0-4 P2:4-8(done) P1:8-12(done)
    assert_eq!(report.completion_of("P2"), Some(8));
    assert_eq!(report.completion_of("P1"), Some(12));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_workload(dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn test_error_names_line() {
    let file = write_temp("4|1\ndisk|one|2\n");
    let err = load_workload(file.path()).unwrap_err();
    assert_eq!(err.to_string(), "line 2: invalid device capacity `one`");
}

#[test]
fn test_load_config_file() {
    let file = write_temp(r#"{ "idle_grace_ms": 5, "seed": 42 }"#);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.idle_grace_ms, 5);
    assert_eq!(config.seed, Some(42));
    assert_eq!(config.poll_interval_us, SimConfig::default().poll_interval_us);
}

#[test]
fn test_load_config_rejects_bad_json() {
    let file = write_temp("{ idle_grace_ms: }");
    assert!(load_config(file.path()).is_err());
}

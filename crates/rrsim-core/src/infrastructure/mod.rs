//! Infrastructure Layer - files and configuration
//!
//! # Responsibilities
//! - Workload file parsing (`loader`)
//! - JSON runtime configuration (`config`)

pub mod config;
pub mod loader;

pub use config::{load_config, ConfigError};
pub use loader::{load_workload, parse_workload, LoadError};

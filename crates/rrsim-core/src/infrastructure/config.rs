//! Runtime configuration files

use crate::domain::system::SimConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`SimConfig`]
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// File that failed
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// Load a [`SimConfig`] from a JSON file
///
/// Missing fields keep their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<SimConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ABOUTME: Application-wide error types for regsweep.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::registry::RegistryError;
use crate::worker::PurgeError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("purge failed after deleting {deleted}: {source}")]
    Purge { deleted: usize, source: PurgeError },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

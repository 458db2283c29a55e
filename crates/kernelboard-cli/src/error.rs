//! Error type for the kernelboard binary.

use kernelboard_report::ExportError;
use kernelboard_yaml::LoadError;
use std::path::PathBuf;
use thiserror::Error;

/// Anything that stops a command. Printed to stderr, exit code 1.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// Config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the expected keys.
    #[error("Invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The HTTP listener could not be bound.
    #[error("Failed to start server on {addr}: {message}")]
    Server { addr: String, message: String },

    #[error("Invalid filter '{0}': expected field=value with field one of job_name, build_name, test_name, architecture, toolchain, device")]
    Filter(String),

    #[error("No plan files found in {0}")]
    EmptyCatalog(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

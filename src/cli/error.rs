//! CLI error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the command-line front end
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Cannot determine the format of {0}; pass --format json or --format xml")]
    UnknownFormat(String),

    #[error("Failed to load configuration from {0}: {1}")]
    ConfigError(PathBuf, String),
}

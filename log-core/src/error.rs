//! # Core Error Types
//!
//! Centralized error definitions for the log-core crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for log-core operations.
///
/// Wraps the configuration and pipeline errors so the worker binary can
/// bubble either one up through a single `?`.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Pipeline(PipelineError),
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

impl From<PipelineError> for CoreError {
    fn from(e: PipelineError) -> Self {
        CoreError::Pipeline(e)
    }
}

/// Configuration-related errors. All of them are fatal at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("LOG_OUTPUT must be 'stdout', 'file', or 'syslog' (got '{value}')")]
    UnsupportedOutput { value: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Errors raised while opening or writing to a log destination.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to set up syslog transport to {address}: {source}")]
    SyslogSetup {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write log line to {destination}: {source}")]
    Write {
        destination: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// The underlying I/O error, whatever stage produced it.
    pub fn io_error(&self) -> &std::io::Error {
        match self {
            PipelineError::OpenFile { source, .. }
            | PipelineError::SyslogSetup { source, .. }
            | PipelineError::Write { source, .. } => source,
        }
    }
}

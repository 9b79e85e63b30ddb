//! # Log Core - Shared Logging Pipeline for Task Workers
//!
//! This crate provides the logging pipeline used by task workers: it reads
//! the environment once, picks a line template, opens one destination and
//! hands back a [`TaskLogger`] that tasks log through.
//!
//! ## Modules
//!
//! - [`config`] - Environment-driven pipeline settings
//! - [`correlation`] - Trace correlation fields and the active trace context
//! - [`error`] - Typed error handling with thiserror
//! - [`pipeline`] - Templates, destinations (console, file, syslog) and the logger
//! - [`traits`] - Core trait definitions
//! - `utils` - Diagnostics subscriber and the local worker runner

// Module declarations - internal modules marked pub(crate)
pub mod config;
pub mod correlation;
pub mod error;
pub mod pipeline;
pub mod traits;
pub(crate) mod utils;

// Selective exports - only public API types
pub use config::{LogFormat, LogSettings, OutputTarget, SyslogAddress};
pub use correlation::{
    current_trace, in_trace, in_trace_sync, CorrelationFields, CorrelationSource,
    DatadogCorrelation, ServiceInfo, TraceContext,
};
pub use error::{ConfigError, CoreError, PipelineError};
pub use pipeline::{
    Destination, LogRecord, SyslogSink, SyslogTransport, TaskLogger, Template, LOGGER_NAME,
};
pub use traits::{Task, TaskResult};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{setup_diagnostics, RunStats, RunnerConfig, WorkerRunner, DEFAULT_DIAGNOSTICS_FILTER};

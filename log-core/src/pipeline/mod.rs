//! # Log Pipeline
//!
//! Template selection, destination handling and the [`TaskLogger`] that
//! binds them together.

pub mod destination;
pub mod format;
pub mod logger;
pub mod syslog;

pub use destination::Destination;
pub use format::{level_name, LogRecord, Template};
pub use logger::{TaskLogger, LOGGER_NAME};
pub use syslog::{SyslogSink, SyslogTransport};

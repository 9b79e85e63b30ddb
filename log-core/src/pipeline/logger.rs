use super::destination::Destination;
use super::format::{format_asctime, level_name, LogRecord, Template};
use crate::config::LogSettings;
use crate::correlation::{CorrelationSource, DatadogCorrelation};
use crate::error::{CoreError, PipelineError};
use chrono::Local;
use std::fmt;
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;
use tracing::Level;

/// Name reported in the `name` field of every line.
pub const LOGGER_NAME: &str = "celery_logger";

/// The task-facing logging entry point.
///
/// Built once at startup and shared (`Arc<TaskLogger>`) by every worker.
/// Lines go only to its own [`Destination`], never to the process-wide
/// tracing subscriber.
pub struct TaskLogger {
    name: String,
    template: Template,
    max_level: Level,
    destination: Destination,
    correlation: Option<Arc<dyn CorrelationSource>>,
}

impl fmt::Debug for TaskLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskLogger")
            .field("name", &self.name)
            .field("template", &self.template)
            .field("max_level", &self.max_level)
            .field("destination", &self.destination.kind())
            .field("correlated", &self.correlation.is_some())
            .finish()
    }
}

impl TaskLogger {
    /// Open the configured destination and bind the matching template.
    ///
    /// Correlation fields come from [`DatadogCorrelation::from_env`] when the
    /// settings ask for them.
    pub fn from_settings(settings: &LogSettings) -> Result<Self, CoreError> {
        let destination = Destination::open(&settings.output)?;
        let correlation: Option<Arc<dyn CorrelationSource>> = if settings.correlated {
            Some(Arc::new(DatadogCorrelation::from_env()))
        } else {
            None
        };
        Ok(Self::new(settings, destination, correlation))
    }

    /// Bind `destination` to the template chosen by `settings`.
    ///
    /// `settings.correlated` decides the template; when it asks for
    /// correlation and no source is given, [`DatadogCorrelation::default`]
    /// is used, and a source given with correlation off is dropped.
    pub fn new(
        settings: &LogSettings,
        destination: Destination,
        correlation: Option<Arc<dyn CorrelationSource>>,
    ) -> Self {
        let template = Template::select(settings.format, settings.correlated);
        let correlation = if settings.correlated {
            Some(correlation.unwrap_or_else(|| -> Arc<dyn CorrelationSource> {
                Arc::new(DatadogCorrelation::default())
            }))
        } else {
            None
        };
        Self {
            name: LOGGER_NAME.to_string(),
            template,
            max_level: settings.max_level,
            destination,
            correlation,
        }
    }

    pub fn template(&self) -> Template {
        self.template
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.max_level
    }

    /// Emit one line for `message` at `level`.
    ///
    /// The reported source location is the caller's. Levels above the
    /// configured threshold are dropped and return `Ok`.
    ///
    /// # Errors
    ///
    /// Write failures of the destination are returned as
    /// [`PipelineError::Write`].
    #[track_caller]
    pub fn log(&self, level: Level, message: &str) -> Result<(), PipelineError> {
        let caller = Location::caller();
        if !self.enabled(level) {
            return Ok(());
        }

        let filename = Path::new(caller.file())
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_else(|| caller.file());

        let record = LogRecord {
            asctime: format_asctime(&Local::now()),
            levelname: level_name(level),
            name: &self.name,
            filename,
            lineno: caller.line(),
            message,
            correlation: self.correlation.as_ref().map(|source| source.fields()),
        };

        let line = self.template.render(&record);
        self.destination.write_line(level, &line)
    }

    #[track_caller]
    pub fn info(&self, message: &str) -> Result<(), PipelineError> {
        self.log(Level::INFO, message)
    }

    #[track_caller]
    pub fn warn(&self, message: &str) -> Result<(), PipelineError> {
        self.log(Level::WARN, message)
    }

    #[track_caller]
    pub fn error(&self, message: &str) -> Result<(), PipelineError> {
        self.log(Level::ERROR, message)
    }

    #[track_caller]
    pub fn debug(&self, message: &str) -> Result<(), PipelineError> {
        self.log(Level::DEBUG, message)
    }
}

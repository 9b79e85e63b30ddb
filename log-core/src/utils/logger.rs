//! Diagnostics subscriber for the worker's own messages.
//!
//! Task log lines never pass through here; they go straight from
//! [`TaskLogger`](crate::TaskLogger) to its destination.

use anyhow::{Context, Result};
use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use std::path::Path;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    prelude::*,
    registry::LookupSpan,
    EnvFilter, Layer,
};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIAGNOSTICS_FILTER: &str = "warn,log_core=info,message_worker=info";

/// Install the global diagnostics subscriber.
///
/// Console output goes to stderr so it never mixes with task lines on
/// stdout. When `log_dir` is given, a daily-rolling file is written there as
/// well; the returned guard MUST be kept alive by the caller.
pub fn setup_diagnostics(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(env_filter());

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::daily(dir, "worker-diagnostics");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .event_format(FileFormatter)
                .with_filter(env_filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to set global diagnostics subscriber")?;

    Ok(guard)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIAGNOSTICS_FILTER))
}

// --- Formatters ---

struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn new() -> Self {
        Self {
            message: String::new(),
            fields: Vec::new(),
        }
    }

    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }
}

fn level_style(level: &Level) -> Style {
    match *level {
        Level::ERROR => Style::new().fg(Color::LightRed).bold(),
        Level::WARN => Style::new().fg(Color::Yellow).bold(),
        Level::INFO => Style::new().fg(Color::LightGreen),
        Level::DEBUG => Style::new().fg(Color::LightBlue),
        Level::TRACE => Style::new().fg(Color::DarkGray),
    }
}

/// Span names from the root down, e.g. `worker`.
fn span_path<S, N>(ctx: &FmtContext<'_, S, N>) -> Option<String>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    let scope = ctx.event_scope()?;
    let names: Vec<&str> = scope.from_root().map(|span| span.name()).collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(":"))
    }
}

pub struct TerminalFormatter;

impl<S, N> FormatEvent<S, N> for TerminalFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let level = event.metadata().level();
        let timestamp = Local::now().format("%H:%M:%S");
        let dimmed = Style::new().dimmed();

        write!(
            writer,
            "{} {:>5} ",
            dimmed.paint(timestamp.to_string()),
            level_style(level).paint(level.to_string())
        )?;

        if let Some(path) = span_path(ctx) {
            write!(writer, "{} ", dimmed.paint(format!("[{}]", path)))?;
        }

        let mut visitor = MessageVisitor::new();
        event.record(&mut visitor);
        writeln!(writer, "{}", visitor.finish())
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let level = event.metadata().level();

        write!(writer, "{} [{}] ", timestamp, level)?;
        if let Some(path) = span_path(ctx) {
            write!(writer, "[{}] ", path)?;
        }

        let mut visitor = MessageVisitor::new();
        event.record(&mut visitor);
        writeln!(writer, "{}", visitor.finish())
    }
}

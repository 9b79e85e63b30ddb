//! Line templates.
//!
//! Four fixed field orders, one per (format × correlation) combination.
//! Rendering is a pure function of the record.

use crate::config::LogFormat;
use crate::correlation::CorrelationFields;
use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::Level;

/// `asctime` layout: `2024-05-01 13:37:00,123`
pub const ASCTIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Level names as they appear in `levelname`.
pub fn level_name(level: Level) -> &'static str {
    match level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        Level::ERROR => "ERROR",
    }
}

pub fn format_asctime(at: &DateTime<Local>) -> String {
    at.format(ASCTIME_FORMAT).to_string()
}

/// Everything a template may draw from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord<'a> {
    pub asctime: String,
    pub levelname: &'static str,
    pub name: &'a str,
    pub filename: &'a str,
    pub lineno: u32,
    pub message: &'a str,
    #[serde(flatten)]
    pub correlation: Option<CorrelationFields>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    JsonCorrelated,
    Json,
    TextCorrelated,
    Text,
}

impl Template {
    pub fn select(format: LogFormat, correlated: bool) -> Self {
        match (format, correlated) {
            (LogFormat::Json, true) => Template::JsonCorrelated,
            (LogFormat::Json, false) => Template::Json,
            (LogFormat::Text, true) => Template::TextCorrelated,
            (LogFormat::Text, false) => Template::Text,
        }
    }

    pub fn is_correlated(&self) -> bool {
        matches!(self, Template::JsonCorrelated | Template::TextCorrelated)
    }

    /// Field names in output order.
    pub fn fields(&self) -> &'static [&'static str] {
        const BASE: &[&str] = &[
            "asctime",
            "levelname",
            "name",
            "filename",
            "lineno",
            "message",
        ];
        const CORRELATED: &[&str] = &[
            "asctime",
            "levelname",
            "name",
            "filename",
            "lineno",
            "message",
            "dd.service",
            "dd.env",
            "dd.version",
            "dd.trace_id",
            "dd.span_id",
        ];
        if self.is_correlated() {
            CORRELATED
        } else {
            BASE
        }
    }

    /// Render one line, without the trailing newline.
    ///
    /// Correlated templates fall back to empty/zero fields when the record
    /// carries none; plain templates ignore any the record carries.
    pub fn render(&self, record: &LogRecord<'_>) -> String {
        match self {
            Template::JsonCorrelated => {
                let mut record = record.clone();
                if record.correlation.is_none() {
                    record.correlation = Some(CorrelationFields::default());
                }
                to_json(&record)
            }
            Template::Json => {
                let mut record = record.clone();
                record.correlation = None;
                to_json(&record)
            }
            Template::TextCorrelated => {
                let dd = record.correlation.clone().unwrap_or_default();
                format!(
                    "{} {} [{}] [{}:{}] [dd.service={} dd.env={} dd.version={} dd.trace_id={} dd.span_id={}] - {}",
                    record.asctime,
                    record.levelname,
                    record.name,
                    record.filename,
                    record.lineno,
                    dd.service,
                    dd.env,
                    dd.version,
                    dd.trace_id,
                    dd.span_id,
                    record.message
                )
            }
            Template::Text => format!(
                "{} {} [{}] [{}:{}] - {}",
                record.asctime,
                record.levelname,
                record.name,
                record.filename,
                record.lineno,
                record.message
            ),
        }
    }
}

fn to_json(record: &LogRecord<'_>) -> String {
    // Only strings and integers in the record, so serialization cannot fail
    serde_json::to_string(record).unwrap_or_else(|e| {
        format!(
            "{{\"levelname\":\"ERROR\",\"message\":\"unserializable record: {}\"}}",
            e
        )
    })
}

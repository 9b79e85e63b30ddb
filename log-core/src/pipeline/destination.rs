use super::syslog::SyslogSink;
use crate::config::OutputTarget;
use crate::error::PipelineError;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

/// Process-lifetime sink for rendered lines.
///
/// Every variant writes through a shared reference, so one destination can
/// be used from many workers without an extra lock.
#[derive(Debug)]
pub enum Destination {
    Console,
    File { path: PathBuf, file: File },
    Syslog(SyslogSink),
}

impl Destination {
    /// Open the sink selected by `target`.
    pub fn open(target: &OutputTarget) -> Result<Self, PipelineError> {
        let destination = match target {
            OutputTarget::Stdout => Destination::Console,
            OutputTarget::File(path) => Self::open_file(path)?,
            OutputTarget::Syslog(address) => Destination::Syslog(SyslogSink::open(address)?),
        };
        info!("Log destination ready: {}", destination.describe());
        Ok(destination)
    }

    /// Append to `path`, creating it if absent.
    pub fn open_file(path: &Path) -> Result<Self, PipelineError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| PipelineError::OpenFile {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Destination::File {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Destination::Console => "stdout",
            Destination::File { .. } => "file",
            Destination::Syslog(_) => "syslog",
        }
    }

    fn describe(&self) -> String {
        match self {
            Destination::Console => "stdout".to_string(),
            Destination::File { path, .. } => format!("file {}", path.display()),
            Destination::Syslog(sink) => format!("syslog via {:?}", sink.transport()),
        }
    }

    /// Write one line; a newline is appended for console and file sinks.
    pub fn write_line(&self, level: Level, line: &str) -> Result<(), PipelineError> {
        let result = match self {
            Destination::Console => {
                let mut out = io::stdout().lock();
                writeln!(out, "{}", line).and_then(|_| out.flush())
            }
            Destination::File { file, .. } => {
                // Single write so concurrent appends never interleave mid-line
                let mut buf = String::with_capacity(line.len() + 1);
                buf.push_str(line);
                buf.push('\n');
                let mut file = file;
                file.write_all(buf.as_bytes())
            }
            Destination::Syslog(sink) => sink.send(level, line),
        };

        result.map_err(|source| PipelineError::Write {
            destination: self.kind(),
            source,
        })
    }
}

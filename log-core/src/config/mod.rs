//! Pipeline configuration resolved from the environment.
//!
//! Every option is read once at startup. Values are trimmed and compared
//! case-insensitively; paths are taken verbatim.

use crate::error::ConfigError;
use std::env;
use std::fmt;
use std::path::PathBuf;
use tracing::Level;

pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
pub const ENV_LOG_OUTPUT: &str = "LOG_OUTPUT";
pub const ENV_LOG_FILE_PATH: &str = "LOG_FILE_PATH";
pub const ENV_SYSLOG_ADDRESS: &str = "SYSLOG_ADDRESS";
pub const ENV_LOG_CORRELATED: &str = "LOG_CORRELATED";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

pub const DEFAULT_LOG_FILE_PATH: &str = "/tmp/celery_tasks.log";
pub const DEFAULT_SYSLOG_ADDRESS: &str = "/dev/log";

/// Host and port used when the local syslog socket cannot be opened.
pub const SYSLOG_FALLBACK_HOST: &str = "localhost";
pub const SYSLOG_FALLBACK_PORT: u16 = 514;

/// Line shape of every emitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable line with bracketed metadata
    Text,
}

impl LogFormat {
    /// Anything other than `json` selects the text format.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Where a syslog forwarder sends its datagrams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyslogAddress {
    /// Unix domain socket path, e.g. `/dev/log`
    Local(PathBuf),
    /// UDP `host:port`
    Network { host: String, port: u16 },
}

impl SyslogAddress {
    /// Parse `[host]:port` or `host:port` into a network address; every
    /// other value, including an empty one, is kept as a local socket path
    /// so that an unusable value ends up on the UDP fallback.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        Self::parse_network(s).unwrap_or_else(|| SyslogAddress::Local(PathBuf::from(s)))
    }

    fn parse_network(s: &str) -> Option<Self> {
        if s.starts_with('/') || s.starts_with('.') {
            return None;
        }

        let (host, port) = match s.strip_prefix('[') {
            Some(rest) => {
                let (host, port) = rest.split_once("]:")?;
                (host, port)
            }
            None => {
                let (host, port) = s.split_once(':')?;
                // A second colon means a bare IPv6 address or a path
                if port.contains(':') {
                    return None;
                }
                (host, port)
            }
        };

        if host.is_empty() {
            return None;
        }
        let port = port.parse::<u16>().ok()?;

        Some(SyslogAddress::Network {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for SyslogAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyslogAddress::Local(path) => write!(f, "{}", path.display()),
            SyslogAddress::Network { host, port } => write!(f, "{}:{}", host, port),
        }
    }
}

/// The single active destination selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
    Syslog(SyslogAddress),
}

impl OutputTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            OutputTarget::Stdout => "stdout",
            OutputTarget::File(_) => "file",
            OutputTarget::Syslog(_) => "syslog",
        }
    }
}

/// Fully resolved logging pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub format: LogFormat,
    pub output: OutputTarget,
    pub correlated: bool,
    pub max_level: Level,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            output: OutputTarget::Stdout,
            correlated: true,
            max_level: Level::INFO,
        }
    }
}

impl LogSettings {
    /// Resolve settings from the process environment.
    ///
    /// Reads `LOG_FORMAT`, `LOG_OUTPUT`, `LOG_FILE_PATH`, `SYSLOG_ADDRESS`,
    /// `LOG_CORRELATED` and `LOG_LEVEL`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unrecognized `LOG_OUTPUT` or an invalid
    /// `LOG_LEVEL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = lookup(ENV_LOG_FORMAT)
            .map(|s| LogFormat::parse(&s))
            .unwrap_or_default();

        let output_raw = lookup(ENV_LOG_OUTPUT).unwrap_or_else(|| "stdout".to_string());
        let output = match output_raw.trim().to_lowercase().as_str() {
            "stdout" => OutputTarget::Stdout,
            "file" => {
                let path = lookup(ENV_LOG_FILE_PATH)
                    .unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string());
                OutputTarget::File(PathBuf::from(path))
            }
            "syslog" => {
                let address = lookup(ENV_SYSLOG_ADDRESS)
                    .unwrap_or_else(|| DEFAULT_SYSLOG_ADDRESS.to_string());
                OutputTarget::Syslog(SyslogAddress::parse(&address))
            }
            _ => {
                return Err(ConfigError::UnsupportedOutput { value: output_raw });
            }
        };

        let correlated = lookup(ENV_LOG_CORRELATED)
            .map(|s| s.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(true);

        let max_level = match lookup(ENV_LOG_LEVEL) {
            Some(raw) => raw
                .trim()
                .parse::<Level>()
                .map_err(|e| ConfigError::InvalidValue {
                    field: ENV_LOG_LEVEL.to_string(),
                    reason: e.to_string(),
                })?,
            None => Level::INFO,
        };

        Ok(Self {
            format,
            output,
            correlated,
            max_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse("plain"), LogFormat::Text);
    }

    #[test]
    fn test_syslog_address_local() {
        assert_eq!(
            SyslogAddress::parse("/dev/log"),
            SyslogAddress::Local(PathBuf::from("/dev/log"))
        );
        assert_eq!(
            SyslogAddress::parse("./run/log.sock"),
            SyslogAddress::Local(PathBuf::from("./run/log.sock"))
        );
    }

    #[test]
    fn test_syslog_address_network() {
        assert_eq!(
            SyslogAddress::parse("logs.internal:1514"),
            SyslogAddress::Network {
                host: "logs.internal".to_string(),
                port: 1514
            }
        );
        assert_eq!(
            SyslogAddress::parse("[::1]:514"),
            SyslogAddress::Network {
                host: "::1".to_string(),
                port: 514
            }
        );
    }

    #[test]
    fn test_unparseable_syslog_address_stays_local() {
        for raw in ["", "  ", "host:notaport", ":514", "::1", "[::1]"] {
            assert_eq!(
                SyslogAddress::parse(raw),
                SyslogAddress::Local(PathBuf::from(raw.trim())),
                "{:?}",
                raw
            );
        }
    }

    #[test]
    fn test_output_kind() {
        assert_eq!(OutputTarget::Stdout.kind(), "stdout");
        assert_eq!(OutputTarget::File(PathBuf::from("/tmp/x")).kind(), "file");
    }
}

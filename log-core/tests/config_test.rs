use log_core::config::{DEFAULT_LOG_FILE_PATH, DEFAULT_SYSLOG_ADDRESS};
use log_core::{ConfigError, LogFormat, LogSettings, OutputTarget, SyslogAddress};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::Level;

fn settings_from(pairs: &[(&str, &str)]) -> Result<LogSettings, ConfigError> {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    LogSettings::from_lookup(|key| env.get(key).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]).unwrap();

        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.output, OutputTarget::Stdout);
        assert!(settings.correlated);
        assert_eq!(settings.max_level, Level::INFO);
        assert_eq!(settings, LogSettings::default());
    }

    #[test]
    fn test_file_output_uses_default_path() {
        let settings = settings_from(&[("LOG_OUTPUT", "file")]).unwrap();
        assert_eq!(
            settings.output,
            OutputTarget::File(PathBuf::from(DEFAULT_LOG_FILE_PATH))
        );
    }

    #[test]
    fn test_file_output_custom_path() {
        let settings =
            settings_from(&[("LOG_OUTPUT", "FILE"), ("LOG_FILE_PATH", "/var/log/tasks.log")])
                .unwrap();
        assert_eq!(
            settings.output,
            OutputTarget::File(PathBuf::from("/var/log/tasks.log"))
        );
    }

    #[test]
    fn test_syslog_output_default_address() {
        let settings = settings_from(&[("LOG_OUTPUT", "syslog")]).unwrap();
        assert_eq!(
            settings.output,
            OutputTarget::Syslog(SyslogAddress::Local(PathBuf::from(DEFAULT_SYSLOG_ADDRESS)))
        );
    }

    #[test]
    fn test_syslog_output_network_address() {
        let settings =
            settings_from(&[("LOG_OUTPUT", "syslog"), ("SYSLOG_ADDRESS", "collector:1514")])
                .unwrap();
        assert_eq!(
            settings.output,
            OutputTarget::Syslog(SyslogAddress::Network {
                host: "collector".to_string(),
                port: 1514
            })
        );
    }

    #[test]
    fn test_path_ignored_for_other_outputs() {
        let settings =
            settings_from(&[("LOG_OUTPUT", "stdout"), ("LOG_FILE_PATH", "/tmp/ignored.log")])
                .unwrap();
        assert_eq!(settings.output, OutputTarget::Stdout);
    }

    #[test]
    fn test_unknown_output_is_fatal() {
        let err = settings_from(&[("LOG_OUTPUT", "kafka")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnsupportedOutput {
                value: "kafka".to_string()
            }
        );
        assert!(err.to_string().contains("'stdout', 'file', or 'syslog'"));
    }

    #[test]
    fn test_correlation_toggle() {
        assert!(settings_from(&[("LOG_CORRELATED", "TRUE")]).unwrap().correlated);
        assert!(!settings_from(&[("LOG_CORRELATED", "false")]).unwrap().correlated);
        // Only "true" enables correlation
        assert!(!settings_from(&[("LOG_CORRELATED", "1")]).unwrap().correlated);
    }

    #[test]
    fn test_text_format() {
        let settings = settings_from(&[("LOG_FORMAT", "Text")]).unwrap();
        assert_eq!(settings.format, LogFormat::Text);
    }

    #[test]
    fn test_log_level() {
        let settings = settings_from(&[("LOG_LEVEL", "warn")]).unwrap();
        assert_eq!(settings.max_level, Level::WARN);

        let err = settings_from(&[("LOG_LEVEL", "loud")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "LOG_LEVEL"));
    }

    #[test]
    fn test_unusable_syslog_address_is_not_fatal() {
        for raw in ["", "  ", "host:notaport", "::1"] {
            let settings = settings_from(&[("LOG_OUTPUT", "syslog"), ("SYSLOG_ADDRESS", raw)])
                .unwrap_or_else(|e| panic!("{:?} rejected: {}", raw, e));
            assert_eq!(
                settings.output,
                OutputTarget::Syslog(SyslogAddress::Local(PathBuf::from(raw.trim())))
            );
        }
    }
}

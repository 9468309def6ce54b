//! # Logging Configuration
//!
//! Configuration for the logging subsystem, read from command line values with
//! environment overrides (`RUST_LOG`, `CRM_LOG_FORMAT`, `CRM_LOG_FILE`, `CRM_ENV`).

use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt as layer_fmt, prelude::*, EnvFilter, Registry};

/// Output format of the console layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line, for log shippers
    Json,
    /// Multi-line human readable output
    Pretty,
    /// Single-line human readable output
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("Unknown log format: {}", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        };
        write!(f, "{}", name)
    }
}

/// Logging configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `server=debug,sea_orm=warn`
    pub level:       String,
    /// Console output format
    pub format:      LogFormat,
    /// Optional log file path; written as daily rolling JSON
    pub log_file:    Option<String>,
    /// Environment (development, testing, production)
    pub environment: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level:       "info".to_string(),
            format:      LogFormat::Compact,
            log_file:    None,
            environment: "development".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Create configuration from environment variables, falling back to the
    /// given values. Unknown formats fall back to compact.
    pub fn from_env(level: &str, format: &str, log_file: Option<&str>) -> Self {
        let format = std::env::var("CRM_LOG_FORMAT").unwrap_or_else(|_| format.to_string());
        Self {
            level:       std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()),
            format:      format.parse().unwrap_or_default(),
            log_file:    std::env::var("CRM_LOG_FILE")
                .ok()
                .or_else(|| log_file.map(str::to_string)),
            environment: std::env::var("CRM_ENV").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Whether this configuration targets a production deployment.
    pub fn is_production(&self) -> bool { self.environment.eq_ignore_ascii_case("production") }

    /// Parse the level directive, falling back to `info` when it is invalid.
    pub fn env_filter(&self) -> EnvFilter { EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info")) }

    /// Build the tracing subscriber from this configuration.
    ///
    /// # Returns
    ///
    /// The subscriber and, when a log file is configured, the guard of its
    /// background writer.
    pub fn build(&self) -> (Box<dyn tracing::Subscriber + Send + Sync>, Option<WorkerGuard>) {
        let (file_layer, guard) = match self.log_file.as_deref() {
            Some(path) => {
                let path = Path::new(path);
                let directory = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "crm.log".to_string());
                let appender = tracing_appender::rolling::daily(directory, file_name);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = layer_fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer);
                (Some(layer), Some(guard))
            },
            None => (None, None),
        };

        let registry = Registry::default().with(self.env_filter()).with(file_layer);
        let timer = layer_fmt::time::UtcTime::rfc_3339();

        let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = match self.format {
            LogFormat::Json => {
                Box::new(registry.with(
                    layer_fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_timer(timer),
                ))
            },
            LogFormat::Pretty => Box::new(registry.with(layer_fmt::layer().pretty().with_timer(timer))),
            LogFormat::Compact => Box::new(registry.with(layer_fmt::layer().compact().with_timer(timer))),
        };

        (subscriber, guard)
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        // Tests touching the environment are serialized
        unsafe {
            std::env::remove_var("RUST_LOG");
            std::env::remove_var("CRM_LOG_FORMAT");
            std::env::remove_var("CRM_LOG_FILE");
            std::env::remove_var("CRM_ENV");
        }
    }

    #[test]
    #[serial]
    fn test_config_from_arguments() {
        clear_env();
        let config = LoggingConfig::from_env("warn", "json", None);
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.environment, "development");
        assert!(!config.is_production());
    }

    #[test]
    #[serial]
    fn test_config_env_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("RUST_LOG", "debug");
            std::env::set_var("CRM_LOG_FORMAT", "pretty");
            std::env::set_var("CRM_ENV", "production");
        }

        let config = LoggingConfig::from_env("info", "json", None);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.is_production());

        clear_env();
    }

    #[test]
    fn test_unknown_format_falls_back_to_compact() {
        assert!("yaml".parse::<LogFormat>().is_err());
        assert_eq!(
            "yaml".parse::<LogFormat>().unwrap_or_default(),
            LogFormat::Compact
        );
        assert_eq!(" JSON ".parse::<LogFormat>().unwrap(), LogFormat::Json);
    }

    #[test]
    fn test_build_without_file_has_no_guard() {
        let config = LoggingConfig::default();
        let (_subscriber, guard) = config.build();
        assert!(guard.is_none());
    }

    #[test]
    fn test_build_with_file_returns_guard() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crm.log");
        let config = LoggingConfig {
            format: LogFormat::Json,
            log_file: Some(path.to_string_lossy().into_owned()),
            ..Default::default()
        };
        let (_subscriber, guard) = config.build();
        assert!(guard.is_some());
    }

    #[test]
    fn test_invalid_level_falls_back() {
        let config = LoggingConfig {
            level: "not a [directive".to_string(),
            ..Default::default()
        };
        let _filter = config.env_filter();
    }
}

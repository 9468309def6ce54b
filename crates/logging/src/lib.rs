//! # CRM Logging Infrastructure
//!
//! Structured logging for the CRM backend built on `tracing`.
//! Provides JSON, pretty and compact output, an optional rolling log file and
//! request id generation.

pub mod config;
pub mod macros;
pub mod request_id;

pub use config::{LogFormat, LoggingConfig};
pub use request_id::RequestId;
// Re-export tracing macros
pub use tracing::{debug, error, info, trace, warn};
pub use tracing_appender::non_blocking::WorkerGuard;

/// Initialize the logging system from command line values and the environment.
///
/// The returned guard flushes the log file writer when dropped, so it must be
/// kept alive for as long as the process logs.
///
/// # Arguments
///
/// * `level` - Log level or filter directive (debug, info, `server=debug,info`)
/// * `format` - Output format (json, pretty, compact)
/// * `log_file` - Optional path to a log file
pub fn init(
    level: &str,
    format: &str,
    log_file: Option<&str>,
) -> Result<Option<WorkerGuard>, tracing::subscriber::SetGlobalDefaultError> {
    init_with_config(LoggingConfig::from_env(level, format, log_file))
}

/// Initialize logging with a custom configuration.
pub fn init_with_config(config: LoggingConfig) -> Result<Option<WorkerGuard>, tracing::subscriber::SetGlobalDefaultError> {
    let (subscriber, guard) = config.build();
    tracing::subscriber::set_global_default(subscriber)?;
    info!(
        level = %config.level,
        format = %config.format,
        environment = %config.environment,
        "Logging initialized"
    );
    Ok(guard)
}

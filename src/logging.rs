//! Planner logging.
//!
//! Structured logging through `tracing`. Log output goes to stderr (or a
//! file) so that command output on stdout stays machine-readable.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Logging configuration options
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to output
    pub level: Level,
    /// Enable colored output
    pub color: bool,
    pub show_timestamps: bool,
    /// Show target/module name
    pub show_target: bool,
    /// Enable JSON format for machine parsing
    pub json_format: bool,
    pub enable_spans: bool,
    /// Write to this file instead of stderr
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_mode(ApplicationMode::Cli)
    }
}

impl LoggingConfig {
    pub fn for_mode(mode: ApplicationMode) -> Self {
        match mode {
            ApplicationMode::Cli => Self {
                level: Level::WARN,
                color: true,
                show_timestamps: false,
                show_target: false,
                json_format: false,
                enable_spans: false,
                file_output: None,
            },
            ApplicationMode::Test => Self {
                level: Level::DEBUG,
                color: false,
                show_timestamps: true,
                show_target: true,
                json_format: false,
                enable_spans: true,
                file_output: None,
            },
        }
    }

    /// Create config from CLI arguments
    pub fn from_args(quiet: bool, verbose: bool, json: bool) -> Self {
        let level = if verbose {
            Level::DEBUG
        } else if quiet {
            Level::ERROR
        } else {
            Level::WARN
        };

        Self {
            level,
            color: !quiet && !json && io::stderr().is_terminal(),
            show_timestamps: verbose || json,
            show_target: verbose,
            json_format: json,
            enable_spans: verbose,
            file_output: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationMode {
    /// Interactive command line
    Cli,
    /// Maximum detail for tests
    Test,
}

/// Initialize the global subscriber. Fails if one is already installed.
pub fn init_logging(config: LoggingConfig) -> io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("planner_engine={}", config.level)));

    let registry = Registry::default().with(env_filter);

    let result = if let Some(log_file) = config.file_output {
        let file_appender = tracing_appender::rolling::never(
            log_file.parent().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "Invalid log file path")
            })?,
            log_file.file_name().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "Invalid log file name")
            })?,
        );

        if config.json_format {
            fmt::layer()
                .json()
                .with_current_span(config.enable_spans)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(file_appender)
                .with_subscriber(registry)
                .try_init()
        } else {
            let fmt_layer = fmt::layer()
                .with_target(config.show_target)
                .with_ansi(false)
                .with_writer(file_appender);

            if config.show_timestamps {
                fmt_layer
                    .with_timer(fmt::time::ChronoUtc::rfc_3339())
                    .with_subscriber(registry)
                    .try_init()
            } else {
                fmt_layer.with_subscriber(registry).try_init()
            }
        }
    } else if config.json_format {
        fmt::layer()
            .json()
            .with_current_span(config.enable_spans)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(io::stderr)
            .with_subscriber(registry)
            .try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_target(config.show_target)
            .with_ansi(config.color)
            .with_writer(io::stderr);

        if config.show_timestamps {
            fmt_layer
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_subscriber(registry)
                .try_init()
        } else {
            fmt_layer.with_subscriber(registry).try_init()
        }
    };

    result.map_err(|e| io::Error::other(e.to_string()))
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).as_deref() == Ok("true")
}

/// Build a config from `PLANNER_LOG_*` environment variables.
pub fn config_from_env() -> LoggingConfig {
    let mut config = LoggingConfig::from_args(
        env_flag("PLANNER_LOG_QUIET"),
        env_flag("PLANNER_LOG_VERBOSE"),
        env_flag("PLANNER_LOG_JSON"),
    );

    let level = match std::env::var("PLANNER_LOG_LEVEL").as_deref() {
        Ok("error") => Some(Level::ERROR),
        Ok("warn") => Some(Level::WARN),
        Ok("info") => Some(Level::INFO),
        Ok("debug") => Some(Level::DEBUG),
        Ok("trace") => Some(Level::TRACE),
        _ => None,
    };
    if let Some(level) = level {
        config.level = level;
    }

    config
}

#[macro_export]
macro_rules! log_task_operation {
    ($operation:expr, $task_id:expr) => {
        tracing::info!(operation = $operation, task_id = $task_id, "Task operation");
    };
    ($operation:expr, $task_id:expr, $details:expr) => {
        tracing::info!(
            operation = $operation,
            task_id = $task_id,
            details = $details,
            "Task operation"
        );
    };
}

/// Utility macro for structured error logging
#[macro_export]
macro_rules! log_error {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Operation failed"
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_from_args_levels() {
        assert_eq!(LoggingConfig::from_args(false, true, false).level, Level::DEBUG);
        assert_eq!(LoggingConfig::from_args(true, false, false).level, Level::ERROR);
        assert_eq!(LoggingConfig::from_args(false, false, false).level, Level::WARN);

        let json = LoggingConfig::from_args(false, false, true);
        assert!(json.json_format);
        assert!(!json.color);
        assert!(json.show_timestamps);
    }

    #[test]
    fn test_test_mode_is_verbose() {
        let config = LoggingConfig::for_mode(ApplicationMode::Test);
        assert_eq!(config.level, Level::DEBUG);
        assert!(!config.color);
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        std::env::set_var("PLANNER_LOG_LEVEL", "trace");
        std::env::set_var("PLANNER_LOG_JSON", "true");
        let config = config_from_env();
        std::env::remove_var("PLANNER_LOG_LEVEL");
        std::env::remove_var("PLANNER_LOG_JSON");

        assert_eq!(config.level, Level::TRACE);
        assert!(config.json_format);
    }
}

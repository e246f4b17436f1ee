//! Logging configuration and the bootstrap trigger the pipeline invokes
//! after validation, before dispatching to the command body.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::validation::{Context, Validate};

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Directory for log files; `None` logs to stdout only.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Whether stdout logging is enabled alongside file output.
    #[serde(default = "default_true")]
    pub enable_stdout: bool,

    /// File rotation policy.
    #[serde(default)]
    pub rotation: RotationPolicy,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON lines.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

/// Log file rotation policy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// Rotate once per day.
    #[default]
    Daily,
    /// Rotate once per hour.
    Hourly,
    /// Never rotate.
    Never,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            log_dir: None,
            enable_stdout: true,
            rotation: RotationPolicy::default(),
        }
    }
}

impl Validate for LoggingConfig {
    fn constraints(&self, ctx: &mut Context<'_>) {
        ctx.require(
            "level",
            is_valid_level(&self.level),
            format!(
                "{:?} is not a valid level (trace, debug, info, warn, error)",
                self.level
            ),
        );
    }
}

/// True when `level` names a recognized log level.
pub fn is_valid_level(level: &str) -> bool {
    parse_level(level).is_ok()
}

fn parse_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}

/// Keeps the non-blocking file writer alive for the lifetime of the command
/// body. Dropping it flushes and stops the background writer.
pub struct LoggingGuard {
    _guard: Option<WorkerGuard>,
}

/// Initialize the logging subsystem from a validated configuration and the
/// service identity. Called exactly once per pipeline run, after validation
/// and before command dispatch.
///
/// If a global subscriber is already installed (embedded test harnesses
/// running several pipelines in one process), the existing subscriber is
/// left in place.
pub fn init(config: &LoggingConfig, service_name: &str) -> Result<LoggingGuard> {
    let default_level = parse_level(&config.level)?;
    let filter = || {
        EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy()
    };

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let guard = if let Some(ref log_dir) = config.log_dir {
        let file_name = format!("{service_name}.log");
        let file_appender = match config.rotation {
            RotationPolicy::Daily => rolling::daily(log_dir, file_name),
            RotationPolicy::Hourly => rolling::hourly(log_dir, file_name),
            RotationPolicy::Never => rolling::never(log_dir, file_name),
        };
        let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

        // File output is always JSON for structured ingestion.
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .with_target(true)
                .with_filter(filter())
                .boxed(),
        );
        Some(guard)
    } else {
        None
    };

    if config.log_dir.is_none() || config.enable_stdout {
        let stdout_layer = match config.format {
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stdout)
                .with_target(true)
                .with_filter(filter())
                .boxed(),
            LogFormat::Pretty => tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(io::stdout)
                .with_target(true)
                .with_filter(filter())
                .boxed(),
        };
        layers.push(stdout_layer);
    }

    let _ = tracing_subscriber::registry().with(layers).try_init();

    tracing::info!(
        service = %service_name,
        level = %config.level,
        format = ?config.format,
        file_output = config.log_dir.is_some(),
        "logging initialized"
    );

    Ok(LoggingGuard { _guard: guard })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    #[test]
    fn test_parse_level() {
        assert!(matches!(parse_level("trace"), Ok(Level::TRACE)));
        assert!(matches!(parse_level("INFO"), Ok(Level::INFO)));
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&LoggingConfig::default()).is_empty());
    }

    #[test]
    fn test_invalid_level_is_a_violation() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..LoggingConfig::default()
        };
        let violations = validate(&config);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.0[0].path, "level");
    }

    #[test]
    fn test_init_stdout_only() {
        let config = LoggingConfig {
            format: LogFormat::Pretty,
            ..LoggingConfig::default()
        };
        // May race with other tests for the global subscriber; init must
        // succeed either way.
        assert!(init(&config, "girder-test").is_ok());
    }
}

use anyhow::Result;
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::domain::models::LoggingConfig;

/// File name of the JSON log written under `logging.log_dir`.
pub const LOG_FILE_NAME: &str = "itersearch.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Stderr output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    pub fn parse(format: &str) -> Result<Self> {
        match format.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Invalid log format: {format}"),
        }
    }
}

/// Logger implementation using tracing
///
/// Stdout is reserved for command results, so console logs go to stderr.
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
}

impl LoggerImpl {
    /// Initialize the global subscriber.
    ///
    /// `RUST_LOG` takes precedence over `config.level`. When `log_dir` is set
    /// a JSON copy of every event is written to `<log_dir>/itersearch.log`;
    /// the returned value must be kept alive for the file writer to flush.
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let default_level = parse_log_level(&config.level)?;
        let format = LogFormat::parse(&config.format)?;

        let env_filter = EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy();

        let mut layers: Vec<BoxedLayer> = vec![stderr_layer(format)];

        let guard = if let Some(ref log_dir) = config.log_dir {
            std::fs::create_dir_all(log_dir)?;
            let file_appender = rolling::never(log_dir, LOG_FILE_NAME);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            // File layer - always JSON for structured logging
            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking_file)
                    .with_ansi(false)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .boxed(),
            );
            Some(guard)
        } else {
            None
        };

        tracing_subscriber::registry()
            .with(layers)
            .with(env_filter)
            .try_init()?;

        tracing::debug!(
            level = %config.level,
            format = ?format,
            file_output = config.log_dir.is_some(),
            "logger initialized"
        );

        Ok(Self { _guard: guard })
    }

    /// Get the worker guard (for testing)
    #[cfg(test)]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self._guard.as_ref()
    }
}

fn stderr_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(io::stderr)
            .with_target(false)
            .boxed(),
    }
}

/// Parse log level string to Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}

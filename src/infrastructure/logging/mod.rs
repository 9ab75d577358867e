//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - pretty, compact or JSON console output on stderr
//! - optional JSON log file through tracing-appender

pub mod logger;

pub use logger::{LogFormat, LoggerImpl};

//! Domain errors for the iterative search pipeline.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Failure of an external tool invocation.
///
/// Every variant is fatal to the run: external tools are never retried and
/// the round's intermediate files are left in place for inspection.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed with {status} (see {} for tool output)", .log.display())]
    Failed {
        tool: String,
        status: ExitStatus,
        log: PathBuf,
    },

    #[error("{tool} timed out after {}s", .timeout.as_secs())]
    TimedOut { tool: String, timeout: Duration },

    #[error("I/O error while running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    /// Label of the tool that failed.
    pub fn tool(&self) -> &str {
        match self {
            Self::Spawn { tool, .. }
            | Self::Failed { tool, .. }
            | Self::TimedOut { tool, .. }
            | Self::Io { tool, .. } => tool,
        }
    }
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Errors raised by the pipeline itself rather than by an external tool.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("No {0} file was given")]
    InputNotSet(&'static str),

    #[error("{} does not exist.", .0.display())]
    MissingInput(PathBuf),

    #[error("Malformed sequence file {}: {message}", .path.display())]
    MalformedSequences { path: PathBuf, message: String },

    #[error("Malformed search report {}: {message}", .path.display())]
    MalformedReport { path: PathBuf, message: String },

    #[error(transparent)]
    Tool(#[from] ToolError),
}

pub type RunResult<T> = Result<T, RunError>;

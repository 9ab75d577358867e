//! External process execution.
//!
//! Every external tool is run from an explicit argument vector (no shell),
//! awaited to completion, and has its stdout/stderr appended to the shared
//! tool log of the run. A non-zero exit status is a [`ToolError::Failed`].

use std::ffi::{OsStr, OsString};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::domain::errors::{ToolError, ToolResult};

/// A single command line to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Human-readable step name, e.g. `"mmseqs search"`
    label: String,
    program: String,
    args: Vec<OsString>,
    /// Redirect stdout here instead of the tool log
    stdout: Option<PathBuf>,
}

impl ToolInvocation {
    pub fn new(label: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args: Vec::new(),
            stdout: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Capture the tool's stdout into `path` (truncating it).
    #[must_use]
    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(path.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn stdout_path(&self) -> Option<&Path> {
        self.stdout.as_deref()
    }

    /// The command line as it would be typed, for logs.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        if let Some(path) = &self.stdout {
            line.push_str(" > ");
            line.push_str(&path.to_string_lossy());
        }
        line
    }
}

/// Runs [`ToolInvocation`]s against a shared log file.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    log_path: PathBuf,
    timeout: Option<Duration>,
}

impl ToolRunner {
    pub fn new(log_path: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            log_path: log_path.into(),
            timeout,
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Run the invocation to completion.
    pub async fn run(&self, invocation: &ToolInvocation) -> ToolResult<()> {
        let tool = invocation.label().to_string();
        let io_err = |source| ToolError::Io {
            tool: tool.clone(),
            source,
        };

        info!(tool = %tool, "{}", invocation.label());
        debug!(tool = %tool, command = %invocation.command_line(), "Spawning");

        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(io_err)?;
        writeln!(log, "### {}", invocation.command_line()).map_err(io_err)?;

        let stderr = Stdio::from(log.try_clone().map_err(io_err)?);
        let stdout = match invocation.stdout_path() {
            Some(path) => Stdio::from(File::create(path).map_err(io_err)?),
            None => Stdio::from(log),
        };

        let started = Instant::now();
        let mut child = Command::new(invocation.program())
            .args(invocation.get_args())
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                error!(tool = %tool, error = %source, "Failed to spawn tool");
                ToolError::Spawn {
                    tool: tool.clone(),
                    source,
                }
            })?;

        let status = match self.timeout {
            Some(limit) => match timeout(limit, child.wait()).await {
                Ok(status) => status.map_err(io_err)?,
                Err(_) => {
                    if let Err(e) = child.kill().await {
                        debug!(tool = %tool, error = %e, "Kill after timeout failed");
                    }
                    error!(tool = %tool, timeout_secs = limit.as_secs(), "Tool timed out");
                    return Err(ToolError::TimedOut {
                        tool,
                        timeout: limit,
                    });
                }
            },
            None => child.wait().await.map_err(io_err)?,
        };

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        if !status.success() {
            error!(tool = %tool, %status, elapsed_ms, "Tool failed");
            return Err(ToolError::Failed {
                tool,
                status,
                log: self.log_path.clone(),
            });
        }

        info!(tool = %tool, elapsed_ms, "Finished {}", invocation.label());
        Ok(())
    }
}

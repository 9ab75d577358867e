//! Domain layer for the iterative search pipeline
//!
//! Models, errors and the ports through which external tools are driven.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{RunError, RunResult, ToolError, ToolResult};

//! CLI command implementations.

pub mod network;
pub mod run;

//! Infrastructure layer module
//!
//! This module contains the adapters to the outside world:
//! - External tool execution and the tool adapters behind the domain ports
//! - FASTA and tabular report parsing
//! - Run directory layout
//! - Configuration management
//! - Logging infrastructure
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod fasta;
pub mod logging;
pub mod process;
pub mod report;
pub mod tools;
pub mod workspace;

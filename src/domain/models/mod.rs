//! Domain models for the iterative search pipeline.

pub mod config;
pub mod round;
pub mod sequence_id_set;

pub use config::{
    Config, ConvergenceConfig, FilterConfig, InputConfig, LoggingConfig, OutputConfig,
    SearchConfig, ToolPaths,
};
pub use round::{RoundRecord, RoundResult, RunSummary, StopReason};
pub use sequence_id_set::SequenceIdSet;

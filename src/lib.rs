//! itersearch - iterative homology search
//!
//! Searches a set of query sequences against a subject database, promotes the
//! newly found hits to queries for the next round and removes them from the
//! subjects, until a round adds too few new hits or a round limit is reached.
//! Each round's hits can optionally be screened by a classifier before they
//! are accepted.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the ports to external tools
//! - **Application Layer** (`application`): the convergence loop
//! - **Service Layer** (`services`): one round, the database lifecycle and the filter stage
//! - **Infrastructure Layer** (`infrastructure`): tool adapters, file formats, config and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use itersearch::application::{ConvergenceController, Toolset};
//! use itersearch::infrastructure::process::ToolRunner;
//! use itersearch::infrastructure::tools::{GrepIdsExtractor, MmseqsEngine};
//! use itersearch::infrastructure::workspace::RunLayout;
//! use itersearch::Config;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::default();
//! let layout = Arc::new(RunLayout::new(&config.output));
//! let runner = Arc::new(ToolRunner::new(layout.tool_log(), None));
//! let tools = Toolset {
//!     engine: Arc::new(MmseqsEngine::new(&config.tools, &config.search, runner.clone())),
//!     extractor: Arc::new(GrepIdsExtractor::new(&config.tools, runner)),
//!     classifier: None,
//! };
//!
//! let mut controller = ConvergenceController::new(&config, tools, layout)?;
//! let summary = controller
//!     .run(Path::new("queries.faa"), Path::new("subjects.faa"))
//!     .await?;
//! println!("{} hits in {}", summary.total_hits, summary.hits_file.display());
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{ConvergenceController, StopPolicy, Toolset};
pub use domain::models::{Config, RoundResult, RunSummary, SequenceIdSet, StopReason};
pub use domain::{RunError, ToolError};
pub use infrastructure::config::{ConfigError, ConfigLoader};

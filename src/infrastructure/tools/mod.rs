//! Adapters for the external tools behind the domain ports.
//!
//! Each adapter turns a port call into one or more [`ToolInvocation`]s and
//! hands them to the shared [`ToolRunner`].
//!
//! [`ToolInvocation`]: crate::infrastructure::process::ToolInvocation
//! [`ToolRunner`]: crate::infrastructure::process::ToolRunner

pub mod grep_ids;
pub mod mmseqs;
pub mod pasv;

pub use grep_ids::GrepIdsExtractor;
pub use mmseqs::MmseqsEngine;
pub use pasv::PasvClassifier;

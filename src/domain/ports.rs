use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::errors::ToolResult;

/// Paths involved in one search of a query database against a subject database.
#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    pub query_db: &'a Path,
    pub subject_db: &'a Path,
    /// Engine-native result database
    pub result_db: &'a Path,
    /// Tabular report to produce from `result_db`
    pub report: &'a Path,
    /// Scratch directory owned by the caller
    pub tmp_dir: &'a Path,
}

/// Sequence search engine (database builder, indexer and searcher)
///
/// Implementations must produce a tab-separated report whose first two
/// columns are the query id and the subject id of each hit.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Build a searchable database at `db` from the FASTA file `sequences`.
    async fn create_db(&self, sequences: &Path, db: &Path) -> ToolResult<()>;

    /// Build auxiliary lookup structures for an existing database.
    async fn create_index(&self, db: &Path, tmp_dir: &Path) -> ToolResult<()>;

    /// Search and write the tabular report.
    async fn search(&self, request: &SearchRequest<'_>) -> ToolResult<()>;
}

/// Id-based sequence extraction
///
/// `ids` is a file with one identifier per line.
#[async_trait]
pub trait SequenceExtractor: Send + Sync {
    /// Write the records of `sequences` whose id is listed in `ids`.
    async fn extract_matching(&self, ids: &Path, sequences: &Path, output: &Path)
        -> ToolResult<()>;

    /// Write the records of `sequences` whose id is NOT listed in `ids`.
    async fn extract_non_matching(
        &self,
        ids: &Path,
        sequences: &Path,
        output: &Path,
    ) -> ToolResult<()>;
}

/// Inputs for one classification run.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyRequest<'a> {
    pub queries: &'a Path,
    pub refs: &'a Path,
    pub outdir: &'a Path,
    pub roi_start: u32,
    pub roi_end: u32,
    pub key_positions: &'a [u32],
}

/// Sequence classifier that partitions its input into labelled files
#[async_trait]
pub trait SequenceClassifier: Send + Sync {
    fn name(&self) -> &str;

    async fn classify(&self, request: &ClassifyRequest<'_>) -> ToolResult<()>;

    /// Where the partition with `label` lands inside `outdir`.
    fn partition_file(&self, outdir: &Path, label: &str) -> PathBuf;
}

//! MMseqs2 search engine adapter.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::domain::errors::ToolResult;
use crate::domain::models::{SearchConfig, ToolPaths};
use crate::domain::ports::{SearchEngine, SearchRequest};
use crate::infrastructure::process::{ToolInvocation, ToolRunner};

/// Drives the `mmseqs` executable: `createdb`, `createindex`, `search` and
/// `convertalis --format-mode 2`.
pub struct MmseqsEngine {
    exe: String,
    threads: u32,
    num_iterations: u32,
    sensitivity: f64,
    runner: Arc<ToolRunner>,
}

impl MmseqsEngine {
    pub fn new(tools: &ToolPaths, search: &SearchConfig, runner: Arc<ToolRunner>) -> Self {
        Self {
            exe: tools.mmseqs.clone(),
            threads: search.threads,
            num_iterations: search.num_iterations,
            sensitivity: search.sensitivity,
            runner,
        }
    }

    fn createdb(&self, sequences: &Path, db: &Path) -> ToolInvocation {
        ToolInvocation::new("Making DB", &self.exe)
            .arg("createdb")
            .arg(sequences)
            .arg(db)
    }

    fn createindex(&self, db: &Path, tmp_dir: &Path) -> ToolInvocation {
        ToolInvocation::new("Indexing DB", &self.exe)
            .arg("createindex")
            .arg(db)
            .arg(tmp_dir)
            .arg("--include-headers")
            .arg("--threads")
            .arg(self.threads.to_string())
    }

    fn search_cmd(&self, request: &SearchRequest<'_>) -> ToolInvocation {
        ToolInvocation::new("Running search", &self.exe)
            .arg("search")
            .arg(request.query_db)
            .arg(request.subject_db)
            .arg(request.result_db)
            .arg(request.tmp_dir)
            .arg("--num-iterations")
            .arg(self.num_iterations.to_string())
            .arg("-s")
            .arg(self.sensitivity.to_string())
            .arg("--threads")
            .arg(self.threads.to_string())
    }

    fn convertalis(&self, request: &SearchRequest<'_>) -> ToolInvocation {
        ToolInvocation::new("Running convertalis", &self.exe)
            .arg("convertalis")
            .arg(request.query_db)
            .arg(request.subject_db)
            .arg(request.result_db)
            .arg(request.report)
            .arg("--threads")
            .arg(self.threads.to_string())
            .arg("--format-mode")
            .arg("2")
    }
}

#[async_trait]
impl SearchEngine for MmseqsEngine {
    fn name(&self) -> &str {
        "mmseqs"
    }

    async fn create_db(&self, sequences: &Path, db: &Path) -> ToolResult<()> {
        self.runner.run(&self.createdb(sequences, db)).await
    }

    async fn create_index(&self, db: &Path, tmp_dir: &Path) -> ToolResult<()> {
        self.runner.run(&self.createindex(db, tmp_dir)).await
    }

    async fn search(&self, request: &SearchRequest<'_>) -> ToolResult<()> {
        self.runner.run(&self.search_cmd(request)).await?;
        self.runner.run(&self.convertalis(request)).await
    }
}

//! `grep_ids` / `anti_grep_ids` extraction adapter.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::domain::errors::ToolResult;
use crate::domain::models::ToolPaths;
use crate::domain::ports::SequenceExtractor;
use crate::infrastructure::process::{ToolInvocation, ToolRunner};

/// Both tools take `<ids_file> <fasta>` and print the selected records to
/// stdout, which is captured into the requested output file.
pub struct GrepIdsExtractor {
    grep_ids: String,
    anti_grep_ids: String,
    runner: Arc<ToolRunner>,
}

impl GrepIdsExtractor {
    pub fn new(tools: &ToolPaths, runner: Arc<ToolRunner>) -> Self {
        Self {
            grep_ids: tools.grep_ids.clone(),
            anti_grep_ids: tools.anti_grep_ids.clone(),
            runner,
        }
    }

    fn invocation(
        label: &str,
        exe: &str,
        ids: &Path,
        sequences: &Path,
        output: &Path,
    ) -> ToolInvocation {
        ToolInvocation::new(label, exe)
            .arg(ids)
            .arg(sequences)
            .stdout_to(output)
    }
}

#[async_trait]
impl SequenceExtractor for GrepIdsExtractor {
    async fn extract_matching(
        &self,
        ids: &Path,
        sequences: &Path,
        output: &Path,
    ) -> ToolResult<()> {
        let cmd = Self::invocation("Pulling seqs by id", &self.grep_ids, ids, sequences, output);
        self.runner.run(&cmd).await
    }

    async fn extract_non_matching(
        &self,
        ids: &Path,
        sequences: &Path,
        output: &Path,
    ) -> ToolResult<()> {
        let cmd = Self::invocation(
            "Removing seqs by id",
            &self.anti_grep_ids,
            ids,
            sequences,
            output,
        );
        self.runner.run(&cmd).await
    }
}

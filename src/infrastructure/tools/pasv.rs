//! PASV classifier adapter.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::errors::ToolResult;
use crate::domain::ports::{ClassifyRequest, SequenceClassifier};
use crate::infrastructure::process::{ToolInvocation, ToolRunner};

/// Runs PASV with clustalo as the aligner. Output partitions are written as
/// `pasv.partition_<LABEL>.fa` in the output directory.
pub struct PasvClassifier {
    exe: String,
    threads: u32,
    runner: Arc<ToolRunner>,
}

impl PasvClassifier {
    pub fn new(exe: impl Into<String>, threads: u32, runner: Arc<ToolRunner>) -> Self {
        Self {
            exe: exe.into(),
            threads,
            runner,
        }
    }

    fn invocation(&self, request: &ClassifyRequest<'_>) -> ToolInvocation {
        ToolInvocation::new("Running PASV", &self.exe)
            .arg("--outdir")
            .arg(request.outdir)
            .args(["--aligner", "clustalo"])
            // Leading backslash keeps PASV from parsing the value as one of its own flags.
            .args(["--alignment-parameters", "\\--threads 1"])
            .arg("--refs")
            .arg(request.refs)
            .arg("--queries")
            .arg(request.queries)
            .arg("--start")
            .arg(request.roi_start.to_string())
            .arg("--end")
            .arg(request.roi_end.to_string())
            .arg("--threads")
            .arg(self.threads.to_string())
            .args(request.key_positions.iter().map(ToString::to_string))
    }
}

#[async_trait]
impl SequenceClassifier for PasvClassifier {
    fn name(&self) -> &str {
        "pasv"
    }

    async fn classify(&self, request: &ClassifyRequest<'_>) -> ToolResult<()> {
        self.runner.run(&self.invocation(request)).await
    }

    fn partition_file(&self, outdir: &Path, label: &str) -> PathBuf {
        outdir.join(format!("pasv.partition_{label}.fa"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> PasvClassifier {
        PasvClassifier::new("pasv", 3, Arc::new(ToolRunner::new("log.txt", None)))
    }

    #[test]
    fn builds_positional_key_positions_last() {
        let request = ClassifyRequest {
            queries: Path::new("w/search.new_queries_iter_2.faa"),
            refs: Path::new("refs.fa"),
            outdir: Path::new("w/PASV_iter_2"),
            roi_start: 437,
            roi_end: 625,
            key_positions: &[437, 439, 441, 462],
        };

        let cmd = classifier().invocation(&request);
        assert_eq!(
            cmd.command_line(),
            "pasv --outdir w/PASV_iter_2 --aligner clustalo --alignment-parameters \\--threads 1 \
             --refs refs.fa --queries w/search.new_queries_iter_2.faa --start 437 --end 625 \
             --threads 3 437 439 441 462"
        );
        // The alignment parameters travel as a single argument.
        assert!(cmd
            .get_args()
            .iter()
            .any(|a| a.to_string_lossy() == "\\--threads 1"));
    }

    #[test]
    fn partition_file_follows_label() {
        let path = classifier().partition_file(Path::new("out"), "NCEC_YES");
        assert_eq!(path, PathBuf::from("out/pasv.partition_NCEC_YES.fa"));
    }
}

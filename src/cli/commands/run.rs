//! `run` command: the iterative search itself.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::application::{ConvergenceController, Toolset};
use crate::cli::output::{list_table, number_cell, output, CommandOutput};
use crate::domain::errors::{RunError, RunResult};
use crate::domain::models::{Config, RunSummary};
use crate::domain::ports::SequenceClassifier;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::LoggerImpl;
use crate::infrastructure::process::ToolRunner;
use crate::infrastructure::tools::{GrepIdsExtractor, MmseqsEngine, PasvClassifier};
use crate::infrastructure::workspace::RunLayout;

/// Every flag overrides the matching configuration value when given.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// FASTA file with the seed queries
    #[arg(short, long)]
    pub queries: Option<PathBuf>,

    /// FASTA file with the subject sequences
    #[arg(short, long = "subject", alias = "subjects")]
    pub subject: Option<PathBuf>,

    /// Basename for every output file
    #[arg(short, long)]
    pub basename: Option<String>,

    /// Output directory
    #[arg(short, long)]
    pub outdir: Option<PathBuf>,

    /// Threads for the external tools
    #[arg(short, long)]
    pub threads: Option<u32>,

    /// Profile iterations inside each search
    #[arg(long)]
    pub num_iters: Option<u32>,

    /// Search sensitivity
    #[arg(long)]
    pub sensitivity: Option<f64>,

    /// Maximum number of search rounds
    #[arg(long)]
    pub max_iters: Option<u32>,

    /// Stop once a round adds at most this percentage of all hits
    #[arg(long)]
    pub min_percent_increase: Option<f64>,

    /// Path to mmseqs
    #[arg(long)]
    pub mmseqs: Option<String>,

    /// Path to grep_ids
    #[arg(long)]
    pub grep_ids: Option<String>,

    /// Path to anti_grep_ids
    #[arg(long)]
    pub anti_grep_ids: Option<String>,

    /// Filter each round's new hits through PASV
    #[arg(long)]
    pub filter: bool,

    /// Path to pasv
    #[arg(long)]
    pub filter_exe: Option<String>,

    /// Reference sequences for PASV
    #[arg(long)]
    pub filter_refs: Option<PathBuf>,

    /// Start of the region of interest
    #[arg(long)]
    pub roi_start: Option<u32>,

    /// End of the region of interest
    #[arg(long)]
    pub roi_end: Option<u32>,

    /// Key residue positions (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub key_positions: Vec<u32>,

    /// PASV partition whose sequences are kept
    #[arg(long)]
    pub accepted_partition: Option<String>,

    /// Kill any external tool running longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub tool_timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (pretty, compact, json)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Also write JSON logs to this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl RunArgs {
    /// Apply the given flags on top of `config`.
    pub fn apply_to(self, config: &mut Config) {
        if self.queries.is_some() {
            config.input.queries = self.queries;
        }
        if self.subject.is_some() {
            config.input.subjects = self.subject;
        }
        set(&mut config.output.basename, self.basename);
        set(&mut config.output.outdir, self.outdir);

        set(&mut config.search.threads, self.threads);
        set(&mut config.search.num_iterations, self.num_iters);
        set(&mut config.search.sensitivity, self.sensitivity);
        if self.tool_timeout.is_some() {
            config.search.tool_timeout_secs = self.tool_timeout;
        }

        set(&mut config.convergence.max_rounds, self.max_iters);
        set(
            &mut config.convergence.min_percent_increase,
            self.min_percent_increase,
        );

        set(&mut config.tools.mmseqs, self.mmseqs);
        set(&mut config.tools.grep_ids, self.grep_ids);
        set(&mut config.tools.anti_grep_ids, self.anti_grep_ids);

        if self.filter {
            config.filter.enabled = true;
        }
        set(&mut config.filter.exe, self.filter_exe);
        if self.filter_refs.is_some() {
            config.filter.refs = self.filter_refs;
        }
        set(&mut config.filter.roi_start, self.roi_start);
        set(&mut config.filter.roi_end, self.roi_end);
        if !self.key_positions.is_empty() {
            config.filter.key_positions = self.key_positions;
        }
        set(&mut config.filter.accepted_partition, self.accepted_partition);

        set(&mut config.logging.level, self.log_level);
        set(&mut config.logging.format, self.log_format);
        if self.log_dir.is_some() {
            config.logging.log_dir = self.log_dir;
        }
    }
}

/// An input path that is configured and exists.
pub fn require_input(path: Option<&Path>, name: &'static str) -> RunResult<PathBuf> {
    let path = path.ok_or(RunError::InputNotSet(name))?;
    if !path.exists() {
        return Err(RunError::MissingInput(path.to_path_buf()));
    }
    Ok(path.to_path_buf())
}

fn toolset(config: &Config, runner: &Arc<ToolRunner>) -> Toolset {
    let classifier = config.filter.enabled.then(|| {
        Arc::new(PasvClassifier::new(
            config.filter.exe.clone(),
            config.search.threads,
            runner.clone(),
        )) as Arc<dyn SequenceClassifier>
    });

    Toolset {
        engine: Arc::new(MmseqsEngine::new(&config.tools, &config.search, runner.clone())),
        extractor: Arc::new(GrepIdsExtractor::new(&config.tools, runner.clone())),
        classifier,
    }
}

pub async fn execute(args: RunArgs, config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let mut config = ConfigLoader::load(config_path)?;
    args.apply_to(&mut config);
    ConfigLoader::validate(&config).context("Invalid configuration")?;

    let _logger = LoggerImpl::init(&config.logging)?;

    let queries = require_input(config.input.queries.as_deref(), "queries")?;
    let subjects = require_input(config.input.subjects.as_deref(), "subject")?;

    let layout = Arc::new(RunLayout::new(&config.output));
    layout
        .prepare()
        .await
        .context("Failed to create output directories")?;

    let runner = Arc::new(ToolRunner::new(
        layout.tool_log(),
        config.search.tool_timeout_secs.map(Duration::from_secs),
    ));

    let mut controller = ConvergenceController::new(&config, toolset(&config, &runner), layout)?;
    let summary = controller.run(&queries, &subjects).await?;

    output(&RunOutput { summary }, json_mode);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    #[serde(flatten)]
    pub summary: RunSummary,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let summary = &self.summary;
        let mut table = list_table(&["round", "new hits", "all hits", "increase", "subjects left"]);
        for record in &summary.rounds {
            table.add_row(vec![
                number_cell(record.round),
                number_cell(
                    record
                        .new_hits
                        .map_or_else(|| "filtered".to_string(), |n| n.to_string()),
                ),
                number_cell(record.all_hits),
                number_cell(
                    record
                        .increase
                        .map_or_else(|| "-".to_string(), |i| format!("{:.2}%", i * 100.0)),
                ),
                number_cell(record.remaining_subjects),
            ]);
        }

        let elapsed = summary.finished_at - summary.started_at;
        format!(
            "{table}\n\nStopped after {} round(s): {}\nTotal hits: {}\nFinal output: {}\nElapsed: {}s",
            summary.rounds_run(),
            summary.stop_reason,
            summary.total_hits,
            summary.hits_file.display(),
            elapsed.num_seconds(),
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

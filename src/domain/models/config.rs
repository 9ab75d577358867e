use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for an iterative search run.
///
/// Built once (defaults, config file, environment, command line) and then
/// treated as immutable for the lifetime of the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Query and subject sequence files
    #[serde(default)]
    pub input: InputConfig,

    /// Output naming and location
    #[serde(default)]
    pub output: OutputConfig,

    /// Options passed through to the search engine
    #[serde(default)]
    pub search: SearchConfig,

    /// Stopping criteria for the round loop
    #[serde(default)]
    pub convergence: ConvergenceConfig,

    /// Paths to external executables
    #[serde(default)]
    pub tools: ToolPaths,

    /// Optional classification stage applied to each round's new hits
    #[serde(default)]
    pub filter: FilterConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input sequence files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InputConfig {
    /// FASTA file with the seed queries
    pub queries: Option<PathBuf>,

    /// FASTA file with the subject sequences to search
    pub subjects: Option<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OutputConfig {
    /// Basename for every file the run writes
    #[serde(default = "default_basename")]
    pub basename: String,

    /// Directory holding `work/` and `hits/`
    #[serde(default = "default_outdir")]
    pub outdir: PathBuf,
}

fn default_basename() -> String {
    "search".to_string()
}

fn default_outdir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            basename: default_basename(),
            outdir: default_outdir(),
        }
    }
}

/// Search engine options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchConfig {
    /// Threads handed to the search engine and the filter
    #[serde(default = "default_threads")]
    pub threads: u32,

    /// Profile iterations inside a single search
    #[serde(default = "default_num_iterations")]
    pub num_iterations: u32,

    /// Search sensitivity
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,

    /// Kill any external tool that runs longer than this (seconds)
    #[serde(default)]
    pub tool_timeout_secs: Option<u64>,
}

const fn default_threads() -> u32 {
    1
}

const fn default_num_iterations() -> u32 {
    2
}

const fn default_sensitivity() -> f64 {
    5.7
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            num_iterations: default_num_iterations(),
            sensitivity: default_sensitivity(),
            tool_timeout_secs: None,
        }
    }
}

/// Round loop stopping criteria
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConvergenceConfig {
    /// Upper bound on the number of rounds
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Keep going only while a round adds more than this percentage of all hits
    #[serde(default = "default_min_percent_increase")]
    pub min_percent_increase: f64,
}

const fn default_max_rounds() -> u32 {
    10
}

const fn default_min_percent_increase() -> f64 {
    10.0
}

impl ConvergenceConfig {
    /// `min_percent_increase` as a fraction (10 -> 0.10).
    pub fn stop_fraction(&self) -> f64 {
        self.min_percent_increase / 100.0
    }
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            min_percent_increase: default_min_percent_increase(),
        }
    }
}

/// External executables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ToolPaths {
    #[serde(default = "default_mmseqs")]
    pub mmseqs: String,

    #[serde(default = "default_grep_ids")]
    pub grep_ids: String,

    #[serde(default = "default_anti_grep_ids")]
    pub anti_grep_ids: String,
}

fn default_mmseqs() -> String {
    "mmseqs".to_string()
}

fn default_grep_ids() -> String {
    "grep_ids".to_string()
}

fn default_anti_grep_ids() -> String {
    "anti_grep_ids".to_string()
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            mmseqs: default_mmseqs(),
            grep_ids: default_grep_ids(),
            anti_grep_ids: default_anti_grep_ids(),
        }
    }
}

/// Classification (PASV) filter stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FilterConfig {
    /// Run each round's new hits through the classifier
    #[serde(default)]
    pub enabled: bool,

    /// Classifier executable
    #[serde(default = "default_filter_exe")]
    pub exe: String,

    /// Reference sequences for the classifier (required when enabled)
    #[serde(default)]
    pub refs: Option<PathBuf>,

    /// Start of the region of interest
    #[serde(default = "default_roi_start")]
    pub roi_start: u32,

    /// End of the region of interest
    #[serde(default = "default_roi_end")]
    pub roi_end: u32,

    /// Key residue positions
    #[serde(default = "default_key_positions")]
    pub key_positions: Vec<u32>,

    /// Label of the partition whose sequences are accepted
    #[serde(default = "default_accepted_partition")]
    pub accepted_partition: String,
}

fn default_filter_exe() -> String {
    "pasv".to_string()
}

const fn default_roi_start() -> u32 {
    437
}

const fn default_roi_end() -> u32 {
    625
}

fn default_key_positions() -> Vec<u32> {
    vec![437, 439, 441, 462]
}

fn default_accepted_partition() -> String {
    "NCEC_YES".to_string()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            exe: default_filter_exe(),
            refs: None,
            roi_start: default_roi_start(),
            roi_end: default_roi_end(),
            key_positions: default_key_positions(),
            accepted_partition: default_accepted_partition(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: pretty, compact or json
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Also write JSON logs to `<log_dir>/itersearch.log`
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

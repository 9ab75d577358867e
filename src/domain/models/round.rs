//! Per-round results and the run summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What a single search round produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// 1-based round index
    pub round: u32,

    /// Accepted new hits, which become the next round's queries.
    /// `None` when the filter stage accepted nothing.
    pub new_queries: Option<PathBuf>,

    /// Subjects minus every hit of this round (filtered or not)
    pub new_subjects: PathBuf,

    /// Number of accepted new hits, `None` when the filter accepted nothing
    pub new_hit_count: Option<usize>,

    /// Size of the cumulative hit set after this round
    pub all_hits_count: usize,

    /// Distinct subject ids reported by the search, before any filtering
    pub raw_hit_count: usize,

    /// Sequences left in `new_subjects`
    pub remaining_subjects: usize,

    /// Tabular search report for this round
    pub report: PathBuf,
}

impl RoundResult {
    /// New hits as a fraction of all hits so far.
    ///
    /// `None` when there is nothing to divide: no accepted hits, or zero new
    /// hits (which stops the loop before any percentage is consulted).
    pub fn increase(&self) -> Option<f64> {
        match self.new_hit_count {
            Some(new_hits) if new_hits > 0 && self.all_hits_count > 0 => {
                Some(new_hits as f64 / self.all_hits_count as f64)
            }
            _ => None,
        }
    }
}

/// Why the round loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The filter stage accepted none of the round's new hits
    FilterRejectedAll,
    /// The round found no new hits
    NoNewHits,
    /// The round's increase fell to or below the configured minimum
    Converged,
    /// The configured round limit was reached
    MaxRoundsReached,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FilterRejectedAll => "no new hits passed the filter",
            Self::NoNewHits => "no new hits",
            Self::Converged => "increase below minimum",
            Self::MaxRoundsReached => "round limit reached",
        };
        f.write_str(text)
    }
}

/// Condensed view of a round kept for the run summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub new_hits: Option<usize>,
    pub all_hits: usize,
    pub increase: Option<f64>,
    pub remaining_subjects: usize,
    pub accepted: Option<PathBuf>,
}

impl From<&RoundResult> for RoundRecord {
    fn from(result: &RoundResult) -> Self {
        Self {
            round: result.round,
            new_hits: result.new_hit_count,
            all_hits: result.all_hits_count,
            increase: result.increase(),
            remaining_subjects: result.remaining_subjects,
            accepted: result.new_queries.clone(),
        }
    }
}

/// Final state of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub rounds: Vec<RoundRecord>,
    pub stop_reason: StopReason,
    pub total_hits: usize,
    pub hits_file: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn rounds_run(&self) -> usize {
        self.rounds.len()
    }
}

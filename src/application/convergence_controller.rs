//! Convergence Controller - the round loop of an iterative search
//!
//! Owns the round counter, the cumulative hit set and the current subject
//! database. Each round's new hits become the next round's queries and are
//! removed from the next round's subjects, until one of the stop conditions
//! holds:
//! - the filter stage accepted nothing
//! - the round found no new hits
//! - the round's new hits are at most `stop_fraction` of all hits
//! - `max_rounds` rounds have run

use anyhow::{Context, Result};
use chrono::Utc;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::models::{Config, RoundRecord, RoundResult, RunSummary, SequenceIdSet, StopReason};
use crate::domain::ports::{SearchEngine, SequenceClassifier, SequenceExtractor};
use crate::infrastructure::fasta;
use crate::infrastructure::workspace::{DatabaseRole, RunLayout};
use crate::services::{DatabaseManager, FilterAdapter, RoundExecutor};

/// Stop criteria evaluated after every round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopPolicy {
    pub max_rounds: u32,
    pub stop_fraction: f64,
}

impl StopPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_rounds: config.convergence.max_rounds,
            stop_fraction: config.convergence.stop_fraction(),
        }
    }

    /// First stop condition that holds for `result`, checked in order:
    /// filter rejected everything, no new hits, increase too small, round
    /// limit reached. `None` means run another round.
    pub fn evaluate(&self, result: &RoundResult) -> Option<StopReason> {
        let new_hits = match (result.new_hit_count, &result.new_queries) {
            (Some(count), Some(_)) => count,
            _ => return Some(StopReason::FilterRejectedAll),
        };

        if new_hits == 0 {
            return Some(StopReason::NoNewHits);
        }

        #[allow(clippy::cast_precision_loss)]
        let increase = new_hits as f64 / result.all_hits_count as f64;
        if increase <= self.stop_fraction {
            return Some(StopReason::Converged);
        }

        if result.round >= self.max_rounds {
            return Some(StopReason::MaxRoundsReached);
        }

        None
    }
}

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Initializing,
    RoundInProgress(u32),
    Stopped(StopReason),
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::RoundInProgress(round) => write!(f, "round {round} in progress"),
            Self::Stopped(reason) => write!(f, "stopped: {reason}"),
        }
    }
}

/// External tools a run is wired to.
#[derive(Clone)]
pub struct Toolset {
    pub engine: Arc<dyn SearchEngine>,
    pub extractor: Arc<dyn SequenceExtractor>,
    /// Required only when filtering is enabled
    pub classifier: Option<Arc<dyn SequenceClassifier>>,
}

pub struct ConvergenceController {
    databases: Arc<DatabaseManager>,
    executor: RoundExecutor,
    layout: Arc<RunLayout>,
    policy: StopPolicy,
    state: ControllerState,
}

impl ConvergenceController {
    /// Wire a controller from validated configuration.
    pub fn new(config: &Config, tools: Toolset, layout: Arc<RunLayout>) -> Result<Self> {
        let databases = Arc::new(DatabaseManager::new(tools.engine.clone(), layout.clone()));

        let filter = if config.filter.enabled {
            let classifier = tools
                .classifier
                .context("Filtering is enabled but no classifier is available")?;
            Some(FilterAdapter::from_config(classifier, &config.filter)?)
        } else {
            None
        };

        let executor = RoundExecutor::new(
            tools.engine,
            tools.extractor,
            databases.clone(),
            filter,
            layout.clone(),
        );

        Ok(Self {
            databases,
            executor,
            layout,
            policy: StopPolicy::from_config(config),
            state: ControllerState::Initializing,
        })
    }

    pub const fn state(&self) -> ControllerState {
        self.state
    }

    /// Run rounds until a stop condition holds, then write the combined hits
    /// file.
    ///
    /// Tool failures abort the run and leave the work directory as it was.
    #[instrument(skip(self), fields(filter = self.executor.filter_enabled()))]
    pub async fn run(&mut self, queries: &Path, subjects: &Path) -> Result<RunSummary> {
        let started_at = Utc::now();
        self.state = ControllerState::Initializing;
        self.layout
            .prepare()
            .await
            .context("Failed to create output directories")?;

        let mut subject_db = self
            .databases
            .build(subjects, DatabaseRole::Subjects, 1)
            .await?;
        self.databases.index(&subject_db).await?;

        let mut hits = SequenceIdSet::new();
        let mut queries = queries.to_path_buf();
        let mut subjects = subjects.to_path_buf();
        let mut accepted: Vec<PathBuf> = Vec::new();
        let mut records = Vec::new();
        let mut round = 0;

        let stop_reason = loop {
            round += 1;
            self.state = ControllerState::RoundInProgress(round);
            info!(round, "starting round");

            // The previous round's databases may still be in use; two back are not.
            if round > 2 {
                self.databases.purge_round(round - 2).await;
            }

            let result = self
                .executor
                .run_round(round, &queries, &subject_db, &subjects, &mut hits)
                .await?;

            if let Some(ref file) = result.new_queries {
                accepted.push(file.clone());
            }
            log_round(&result);
            records.push(RoundRecord::from(&result));

            let next_queries = match (self.policy.evaluate(&result), &result.new_queries) {
                (None, Some(next)) => next.clone(),
                (reason, _) => break reason.unwrap_or(StopReason::FilterRejectedAll),
            };

            let next_db = self
                .databases
                .build(&result.new_subjects, DatabaseRole::Subjects, round + 1)
                .await?;
            self.databases.discard(&subject_db).await;
            subject_db = next_db;
            queries = next_queries;
            subjects = result.new_subjects;
        };

        self.state = ControllerState::Stopped(stop_reason);
        info!(round, reason = %stop_reason, "stopping iteration");

        self.databases.purge_all().await;

        let hits_file = self.layout.hits_file();
        fasta::concatenate(&accepted, &hits_file)
            .with_context(|| format!("Failed to write {}", hits_file.display()))?;
        info!("Final output: {}", hits_file.display());

        Ok(RunSummary {
            rounds: records,
            stop_reason,
            total_hits: hits.size(),
            hits_file,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

fn log_round(result: &RoundResult) {
    match result.new_hit_count {
        Some(new_hits) => {
            let percent = result.increase().unwrap_or(0.0) * 100.0;
            info!(
                round = result.round,
                new_hits,
                all_hits = result.all_hits_count,
                remaining_subjects = result.remaining_subjects,
                "Iter: {}, new hits: {}, all hits: {}, increase: {:.2}%, new db size: {}",
                result.round,
                new_hits,
                result.all_hits_count,
                percent,
                result.remaining_subjects
            );
        }
        None => info!(
            round = result.round,
            raw_hits = result.raw_hit_count,
            "No seqs passed filtering in iter {}",
            result.round
        ),
    }
    debug!(report = %result.report.display(), "round report");
}

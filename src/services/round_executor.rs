//! Round Executor
//!
//! One round of the search loop: search the current queries against the
//! current subject database, work out which hits are new, optionally pass them
//! through the filter stage, and write the next round's query and subject
//! files.

use anyhow::{Context, Result};
use std::io;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::domain::models::{RoundResult, SequenceIdSet};
use crate::domain::ports::{SearchEngine, SearchRequest, SequenceExtractor};
use crate::infrastructure::workspace::{DatabaseRole, RunLayout};
use crate::infrastructure::{fasta, report};
use crate::services::database_lifecycle::{DatabaseHandle, DatabaseManager};
use crate::services::filter_adapter::FilterAdapter;

pub struct RoundExecutor {
    engine: Arc<dyn SearchEngine>,
    extractor: Arc<dyn SequenceExtractor>,
    databases: Arc<DatabaseManager>,
    filter: Option<FilterAdapter>,
    layout: Arc<RunLayout>,
}

impl RoundExecutor {
    pub fn new(
        engine: Arc<dyn SearchEngine>,
        extractor: Arc<dyn SequenceExtractor>,
        databases: Arc<DatabaseManager>,
        filter: Option<FilterAdapter>,
        layout: Arc<RunLayout>,
    ) -> Self {
        Self {
            engine,
            extractor,
            databases,
            filter,
            layout,
        }
    }

    pub const fn filter_enabled(&self) -> bool {
        self.filter.is_some()
    }

    /// Run round `round`.
    ///
    /// `hits` is the cumulative hit set; it only grows, and only by the hits
    /// this round accepts. Every reported subject is removed from the next
    /// round's subjects whether or not the filter accepts it.
    #[instrument(skip(self, subject_db, hits), fields(subject_db = %subject_db.path.display()))]
    pub async fn run_round(
        &self,
        round: u32,
        queries: &Path,
        subject_db: &DatabaseHandle,
        subjects: &Path,
        hits: &mut SequenceIdSet,
    ) -> Result<RoundResult> {
        let new_queries = self.layout.new_queries(round);
        let new_subjects = self.layout.new_subjects(round);
        let report_path = self.layout.report(round);
        for stale in [&new_queries, &new_subjects, &report_path] {
            remove_if_exists(stale)
                .await
                .with_context(|| format!("Failed to remove stale {}", stale.display()))?;
        }

        self.search(round, queries, subject_db).await?;

        let hit_ids = report::subject_ids(&report_path)?;
        debug!(round, hits = hit_ids.size(), "distinct subjects in report");

        let ids_file = self.scratch_file("hit_ids")?;
        fasta::write_ids(&hit_ids, ids_file.path()).context("Failed to write hit ids")?;

        self.extractor
            .extract_non_matching(ids_file.path(), subjects, &new_subjects)
            .await
            .context("Failed to make new subject sequences")?;

        let raw_hits = self.scratch_file("raw_hits")?;
        self.extractor
            .extract_matching(ids_file.path(), subjects, raw_hits.path())
            .await
            .context("Failed to pull hit sequences")?;

        // Ids come from the extracted records, not the report, so a report id
        // with no matching subject record never counts as a hit.
        let raw_ids = fasta::read_ids(raw_hits.path())?;
        let candidates = hits.difference(&raw_ids);
        info!(round, new_hits = candidates.size(), "total new hits");

        let names_file = self.scratch_file("new_names")?;
        fasta::write_ids(&candidates, names_file.path()).context("Failed to write new hit ids")?;
        self.extractor
            .extract_matching(names_file.path(), raw_hits.path(), &new_queries)
            .await
            .context("Failed to pull new hits for the next round")?;

        let (new_queries, new_hit_count) = match &self.filter {
            None => {
                hits.extend(candidates.iter());
                (Some(new_queries), Some(candidates.size()))
            }
            Some(_) if candidates.is_empty() => (Some(new_queries), Some(0)),
            Some(filter) => {
                let outdir = self.layout.filter_outdir(round);
                match filter.accepted_sequences(&new_queries, &outdir).await? {
                    Some(accepted) => {
                        let accepted_new = hits.difference(&fasta::read_ids(&accepted)?);
                        hits.extend(accepted_new.iter());
                        info!(round, accepted = accepted_new.size(), "new hits passed the filter");
                        (Some(accepted), Some(accepted_new.size()))
                    }
                    None => {
                        info!(round, "no new hits passed the filter");
                        (None, None)
                    }
                }
            }
        };

        let remaining_subjects = fasta::count_sequences(&new_subjects)?;

        Ok(RoundResult {
            round,
            new_queries,
            new_subjects,
            new_hit_count,
            all_hits_count: hits.size(),
            raw_hit_count: hit_ids.size(),
            remaining_subjects,
            report: report_path,
        })
    }

    /// Build a query database, search it and drop it again.
    async fn search(&self, round: u32, queries: &Path, subject_db: &DatabaseHandle) -> Result<()> {
        let query_db = self
            .databases
            .build(queries, DatabaseRole::Queries, round)
            .await?;
        let result_db = self.layout.result_db(round);
        let report_path = self.layout.report(round);
        let tmp = tempfile::Builder::new()
            .prefix("tmp")
            .tempdir_in(self.layout.work_dir())
            .context("Failed to create search scratch directory")?;

        let request = SearchRequest {
            query_db: &query_db.path,
            subject_db: &subject_db.path,
            result_db: &result_db,
            report: &report_path,
            tmp_dir: tmp.path(),
        };
        self.engine
            .search(&request)
            .await
            .with_context(|| format!("Search failed in round {round}"))?;

        self.databases.discard(&query_db).await;
        Ok(())
    }

    fn scratch_file(&self, prefix: &str) -> Result<NamedTempFile> {
        tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".txt")
            .tempfile_in(self.layout.work_dir())
            .context("Failed to create scratch file")
    }
}

async fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

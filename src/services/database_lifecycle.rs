//! Database Lifecycle Manager
//!
//! Builds, indexes and removes the search-engine databases of a run. The
//! subject database shrinks every round: each new one is built from the
//! previous round's remaining-subjects file and the superseded one is
//! discarded.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::domain::ports::SearchEngine;
use crate::infrastructure::workspace::{DatabaseRole, RunLayout, DB_SUFFIX, REPORT_SUFFIX};

/// Handle to a database built from a sequence file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseHandle {
    /// Engine-native database path (`<work>/<basename>.<role>_iter_<n>.mmseqs_db`)
    pub path: PathBuf,
    /// Sequence file the database was built from
    pub source: PathBuf,
}

pub struct DatabaseManager {
    engine: Arc<dyn SearchEngine>,
    layout: Arc<RunLayout>,
}

impl DatabaseManager {
    pub fn new(engine: Arc<dyn SearchEngine>, layout: Arc<RunLayout>) -> Self {
        Self { engine, layout }
    }

    /// Build the database searched as `role` in round `round` from
    /// `sequences`.
    ///
    /// Any leftover database of the same name is removed first. The name
    /// depends only on role and round, never on the input file name.
    #[instrument(skip(self), fields(engine = self.engine.name()))]
    pub async fn build(
        &self,
        sequences: &Path,
        role: DatabaseRole,
        round: u32,
    ) -> Result<DatabaseHandle> {
        let path = self.layout.db_for(role, round);
        remove_matching(self.layout.work_dir(), |name| is_db_file_of(name, &path)).await;

        self.engine
            .create_db(sequences, &path)
            .await
            .with_context(|| format!("Failed to build database from {}", sequences.display()))?;

        debug!(db = %path.display(), "database built");
        Ok(DatabaseHandle {
            path,
            source: sequences.to_path_buf(),
        })
    }

    /// Index a database. The scratch directory is removed when indexing ends.
    #[instrument(skip(self, handle), fields(db = %handle.path.display()))]
    pub async fn index(&self, handle: &DatabaseHandle) -> Result<()> {
        let scratch = tempfile::Builder::new()
            .prefix("tmp_index")
            .tempdir_in(self.layout.work_dir())
            .context("Failed to create index scratch directory")?;

        self.engine
            .create_index(&handle.path, scratch.path())
            .await
            .with_context(|| format!("Failed to index database {}", handle.path.display()))
    }

    /// Remove every file of a database. Failures are logged, never returned.
    pub async fn discard(&self, handle: &DatabaseHandle) {
        let removed =
            remove_matching(self.layout.work_dir(), |name| is_db_file_of(name, &handle.path))
                .await;
        debug!(
            db = %handle.path.display(),
            source = %handle.source.display(),
            removed,
            "database discarded"
        );
    }

    /// Remove databases belonging to round `round`, keeping its report.
    pub async fn purge_round(&self, round: u32) {
        let removed = remove_matching(self.layout.work_dir(), |name| {
            is_intermediate_db(name) && mentions_round(name, round)
        })
        .await;
        if removed > 0 {
            info!(round, removed, "removed stale databases");
        }
    }

    /// Remove every remaining database in the work directory, keeping reports.
    pub async fn purge_all(&self) {
        let removed = remove_matching(self.layout.work_dir(), is_intermediate_db).await;
        info!(removed, "removed intermediate databases");
    }
}

/// Database files carry the database suffix in their name; reports are kept.
fn is_intermediate_db(name: &str) -> bool {
    name.contains(DB_SUFFIX.trim_start_matches('.')) && !name.ends_with(REPORT_SUFFIX)
}

/// `name` is `db` itself or one of its companion files (`db.index`, `db_h`, ...).
fn is_db_file_of(name: &str, db: &Path) -> bool {
    db.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|db_name| name.starts_with(db_name) && !name.ends_with(REPORT_SUFFIX))
}

/// `name` contains `iter_<round>` not followed by another digit.
fn mentions_round(name: &str, round: u32) -> bool {
    let needle = format!("iter_{round}");
    name.match_indices(&needle).any(|(start, _)| {
        !name[start + needle.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    })
}

/// Best-effort removal of the work-directory entries whose file name
/// satisfies `predicate`. Returns how many were removed.
async fn remove_matching<F>(dir: &Path, predicate: F) -> usize
where
    F: Fn(&str) -> bool,
{
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot list directory for cleanup");
            return 0;
        }
    };

    let mut removed = 0;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cleanup listing interrupted");
                break;
            }
        };

        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !predicate(name) {
            continue;
        }

        let path = entry.path();
        let result = match entry.file_type().await {
            Ok(kind) if kind.is_dir() => fs::remove_dir_all(&path).await,
            _ => fs::remove_file(&path).await,
        };
        match result {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove database file"),
        }
    }
    removed
}

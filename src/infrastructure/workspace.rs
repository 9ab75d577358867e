//! On-disk layout of a run.
//!
//! ```text
//! <outdir>/
//!   work/
//!     mmseqs_log.txt
//!     <basename>.iter_<n>.mmseqs_db[.btab.txt]
//!     <basename>.{queries,subjects}_iter_<n>.mmseqs_db
//!     <basename>.new_queries_iter_<n>.faa
//!     <basename>.new_subjects_iter_<n>.faa
//!     PASV_iter_<n>/
//!   hits/
//!     <basename>.hits.faa
//! ```

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::models::OutputConfig;

/// Suffix shared by every search-engine database the run creates.
pub const DB_SUFFIX: &str = ".mmseqs_db";

/// Suffix of the per-round tabular report, appended to the result database name.
pub const REPORT_SUFFIX: &str = ".btab.txt";

/// What a database built from a sequence file is searched as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseRole {
    Queries,
    Subjects,
}

impl DatabaseRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queries => "queries",
            Self::Subjects => "subjects",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    basename: String,
    outdir: PathBuf,
    work_dir: PathBuf,
    hits_dir: PathBuf,
}

impl RunLayout {
    pub fn new(output: &OutputConfig) -> Self {
        Self {
            basename: output.basename.clone(),
            outdir: output.outdir.clone(),
            work_dir: output.outdir.join("work"),
            hits_dir: output.outdir.join("hits"),
        }
    }

    /// Create `outdir`, `work/` and `hits/`.
    pub async fn prepare(&self) -> io::Result<()> {
        fs::create_dir_all(&self.outdir).await?;
        fs::create_dir_all(&self.work_dir).await?;
        fs::create_dir_all(&self.hits_dir).await
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn hits_dir(&self) -> &Path {
        &self.hits_dir
    }

    /// Shared log capturing the output of every external tool.
    pub fn tool_log(&self) -> PathBuf {
        self.work_dir.join("mmseqs_log.txt")
    }

    fn stem(&self) -> PathBuf {
        self.work_dir.join(&self.basename)
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut name = self.stem().into_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    pub fn new_queries(&self, round: u32) -> PathBuf {
        self.with_suffix(&format!(".new_queries_iter_{round}.faa"))
    }

    pub fn new_subjects(&self, round: u32) -> PathBuf {
        self.with_suffix(&format!(".new_subjects_iter_{round}.faa"))
    }

    /// Engine-native result database of a round's search.
    pub fn result_db(&self, round: u32) -> PathBuf {
        self.with_suffix(&format!(".iter_{round}{DB_SUFFIX}"))
    }

    /// Tabular report of a round's search.
    pub fn report(&self, round: u32) -> PathBuf {
        self.with_suffix(&format!(".iter_{round}{DB_SUFFIX}{REPORT_SUFFIX}"))
    }

    /// Output directory of the filter stage for a round.
    pub fn filter_outdir(&self, round: u32) -> PathBuf {
        self.work_dir.join(format!("PASV_iter_{round}"))
    }

    /// Database searched as `role` in round `round`. Named after its use
    /// rather than its input file, so inputs sharing a file name never
    /// share a database.
    pub fn db_for(&self, role: DatabaseRole, round: u32) -> PathBuf {
        self.with_suffix(&format!(".{}_iter_{round}{DB_SUFFIX}", role.as_str()))
    }

    /// Final concatenated output.
    pub fn hits_file(&self) -> PathBuf {
        self.hits_dir.join(format!("{}.hits.faa", self.basename))
    }
}

//! Common test utilities for integration tests
//!
//! In-process stand-ins for the external tools, plus fixtures for building
//! sequence files and wiring a controller against them.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use itersearch::application::{ConvergenceController, Toolset};
use itersearch::domain::errors::{ToolError, ToolResult};
use itersearch::domain::models::Config;
use itersearch::domain::ports::{
    ClassifyRequest, SearchEngine, SearchRequest, SequenceClassifier, SequenceExtractor,
};
use itersearch::infrastructure::fasta;
use itersearch::infrastructure::workspace::RunLayout;

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Write a FASTA file with one short record per id.
pub fn write_fasta(dir: &Path, name: &str, ids: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    for id in ids {
        writeln!(file, ">{id} some description\nMKVLAAGIVGLLLAQ\nPRTSEQ").unwrap();
    }
    path
}

/// `prefix1 .. prefixN`
pub fn ids(prefix: &str, range: std::ops::RangeInclusive<usize>) -> Vec<String> {
    range.map(|i| format!("{prefix}{i}")).collect()
}

/// Record ids of a FASTA file, in file order.
pub fn ids_in_order(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter_map(|line| line.strip_prefix('>'))
        .map(|header| header.split_whitespace().next().unwrap_or("").to_string())
        .collect()
}

/// Which subjects each query hits.
#[derive(Debug, Default, Clone)]
pub struct HitGraph {
    edges: HashMap<String, Vec<String>>,
}

impl HitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(mut self, query: &str, subjects: &[String]) -> Self {
        self.edges
            .entry(query.to_string())
            .or_default()
            .extend(subjects.iter().cloned());
        self
    }

    /// Every id in `queries` hits every id in `subjects`.
    pub fn connect_all(mut self, queries: &[String], subjects: &[String]) -> Self {
        for query in queries {
            self = self.connect(query, subjects);
        }
        self
    }

    fn hits_of(&self, query: &str) -> &[String] {
        self.edges.get(query).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Search engine whose "databases" are copies of the FASTA input.
///
/// A search reports `query -> subject` for every graph edge whose subject is
/// still present in the subject database, so shrinking the database is
/// observable.
pub struct FakeSearchEngine {
    graph: HitGraph,
    fail_search: bool,
    pub searches: AtomicUsize,
    pub indexes: AtomicUsize,
    pub dbs_built: AtomicUsize,
}

impl FakeSearchEngine {
    pub fn new(graph: HitGraph) -> Self {
        Self {
            graph,
            fail_search: false,
            searches: AtomicUsize::new(0),
            indexes: AtomicUsize::new(0),
            dbs_built: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_search: true,
            ..Self::new(HitGraph::new())
        }
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

fn companion(db: &Path, suffix: &str) -> PathBuf {
    let mut name = db.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[async_trait]
impl SearchEngine for FakeSearchEngine {
    fn name(&self) -> &str {
        "fake-search"
    }

    async fn create_db(&self, sequences: &Path, db: &Path) -> ToolResult<()> {
        std::fs::copy(sequences, db).map_err(|source| ToolError::Io {
            tool: "fake createdb".to_string(),
            source,
        })?;
        std::fs::write(companion(db, ".index"), "").unwrap();
        std::fs::write(companion(db, "_h"), "").unwrap();
        self.dbs_built.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create_index(&self, db: &Path, tmp_dir: &Path) -> ToolResult<()> {
        assert!(db.exists(), "indexing a database that was never built");
        assert!(tmp_dir.is_dir());
        std::fs::write(companion(db, ".idx"), "").unwrap();
        self.indexes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn search(&self, request: &SearchRequest<'_>) -> ToolResult<()> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(ToolError::Io {
                tool: "fake search".to_string(),
                source: std::io::Error::other("search crashed"),
            });
        }

        let queries = ids_in_order(request.query_db);
        let subjects: HashSet<String> = ids_in_order(request.subject_db).into_iter().collect();

        let mut report = std::fs::File::create(request.report).unwrap();
        for query in &queries {
            for subject in self.graph.hits_of(query) {
                if subjects.contains(subject) {
                    writeln!(report, "{query}\t{subject}\t95.0\t120\t1e-30").unwrap();
                }
            }
        }
        std::fs::write(request.result_db, "").unwrap();
        std::fs::write(companion(request.result_db, ".index"), "").unwrap();
        Ok(())
    }
}

/// `grep_ids` / `anti_grep_ids` over the records of a FASTA file, keeping
/// record bytes unchanged.
#[derive(Default)]
pub struct FakeExtractor;

impl FakeExtractor {
    fn filter(ids: &Path, sequences: &Path, output: &Path, keep_listed: bool) -> ToolResult<()> {
        let wanted: HashSet<String> = std::fs::read_to_string(ids)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        let content = std::fs::read_to_string(sequences).map_err(|source| ToolError::Io {
            tool: "fake grep_ids".to_string(),
            source,
        })?;

        let mut out = String::new();
        let mut keep = false;
        for line in content.split_inclusive('\n') {
            if let Some(header) = line.strip_prefix('>') {
                let id = header.split_whitespace().next().unwrap_or("");
                keep = wanted.contains(id) == keep_listed;
            }
            if keep {
                out.push_str(line);
            }
        }
        std::fs::write(output, out).unwrap();
        Ok(())
    }
}

#[async_trait]
impl SequenceExtractor for FakeExtractor {
    async fn extract_matching(&self, ids: &Path, sequences: &Path, output: &Path) -> ToolResult<()> {
        Self::filter(ids, sequences, output, true)
    }

    async fn extract_non_matching(
        &self,
        ids: &Path,
        sequences: &Path,
        output: &Path,
    ) -> ToolResult<()> {
        Self::filter(ids, sequences, output, false)
    }
}

/// Classifier accepting a fixed set of ids into `NCEC_YES`, the rest into
/// `NCEC_NO`. Empty partitions are not written.
pub struct FakeClassifier {
    accept: HashSet<String>,
    pub calls: AtomicUsize,
}

impl FakeClassifier {
    pub fn accepting(ids: &[String]) -> Self {
        Self {
            accept: ids.iter().cloned().collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting_all() -> Self {
        Self::accepting(&[])
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SequenceClassifier for FakeClassifier {
    fn name(&self) -> &str {
        "fake-classifier"
    }

    async fn classify(&self, request: &ClassifyRequest<'_>) -> ToolResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::fs::create_dir_all(request.outdir).unwrap();

        let (yes, no): (Vec<String>, Vec<String>) = ids_in_order(request.queries)
            .into_iter()
            .partition(|id| self.accept.contains(id));
        for (label, ids) in [("NCEC_YES", yes), ("NCEC_NO", no)] {
            if !ids.is_empty() {
                let name = format!("pasv.partition_{label}.fa");
                write_fasta(request.outdir, &name, &ids);
            }
        }
        Ok(())
    }

    fn partition_file(&self, outdir: &Path, label: &str) -> PathBuf {
        outdir.join(format!("pasv.partition_{label}.fa"))
    }
}

/// A temporary run: input files, configuration and tools.
pub struct Scenario {
    pub dir: TempDir,
    pub queries: PathBuf,
    pub subjects: PathBuf,
    pub config: Config,
    pub engine: Arc<FakeSearchEngine>,
    pub classifier: Option<Arc<FakeClassifier>>,
}

impl Scenario {
    pub fn new(queries: &[String], subjects: &[String], graph: HitGraph) -> Self {
        Self::with_engine(queries, subjects, FakeSearchEngine::new(graph))
    }

    pub fn with_engine(queries: &[String], subjects: &[String], engine: FakeSearchEngine) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let queries = write_fasta(dir.path(), "queries.faa", queries);
        let subjects = write_fasta(dir.path(), "subjects.faa", subjects);

        let mut config = Config::default();
        config.output.outdir = dir.path().join("out");

        Self {
            dir,
            queries,
            subjects,
            config,
            engine: Arc::new(engine),
            classifier: None,
        }
    }

    /// Enable the filter stage with `classifier`.
    pub fn with_filter(mut self, classifier: FakeClassifier) -> Self {
        self.config.filter.enabled = true;
        self.config.filter.refs = Some(self.dir.path().join("refs.fa"));
        self.classifier = Some(Arc::new(classifier));
        self
    }

    pub fn layout(&self) -> Arc<RunLayout> {
        Arc::new(RunLayout::new(&self.config.output))
    }

    pub fn toolset(&self) -> Toolset {
        Toolset {
            engine: self.engine.clone(),
            extractor: Arc::new(FakeExtractor),
            classifier: self
                .classifier
                .clone()
                .map(|c| c as Arc<dyn SequenceClassifier>),
        }
    }

    pub fn controller(&self) -> ConvergenceController {
        ConvergenceController::new(&self.config, self.toolset(), self.layout()).unwrap()
    }

    pub fn work_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.layout().work_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn count(&self, path: &Path) -> usize {
        fasta::count_sequences(path).unwrap()
    }
}

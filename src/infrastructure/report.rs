//! Tabular search report parsing.
//!
//! The report is tab separated with no header. Column 1 is the query id and
//! column 2 the subject (target) id; any further columns are ignored.

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use crate::domain::errors::{RunError, RunResult};
use crate::domain::models::SequenceIdSet;

/// A query/subject pair from one report row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HitPair {
    pub query: String,
    pub subject: String,
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(input)
}

fn pair(record: &StringRecord, path: &Path) -> RunResult<HitPair> {
    match (record.get(0), record.get(1)) {
        (Some(query), Some(subject)) => Ok(HitPair {
            query: query.to_string(),
            subject: subject.to_string(),
        }),
        _ => Err(RunError::MalformedReport {
            path: path.to_path_buf(),
            message: format!(
                "line {} has fewer than two columns",
                record.position().map_or(0, csv::Position::line)
            ),
        }),
    }
}

fn rows<R: Read>(input: R, path: &Path, mut visit: impl FnMut(HitPair)) -> RunResult<()> {
    for record in reader(input).records() {
        let record = record.map_err(|e| RunError::MalformedReport {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        visit(pair(&record, path)?);
    }
    Ok(())
}

fn open(path: &Path) -> RunResult<std::fs::File> {
    std::fs::File::open(path).map_err(|e| RunError::MalformedReport {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Distinct subject ids hit by any query.
pub fn subject_ids(path: &Path) -> RunResult<SequenceIdSet> {
    let mut ids = SequenceIdSet::new();
    rows(open(path)?, path, |hit| {
        ids.add(hit.subject);
    })?;
    Ok(ids)
}

/// Distinct query/subject pairs in first-seen order.
pub fn distinct_pairs(path: &Path) -> RunResult<Vec<HitPair>> {
    let mut seen = HashSet::new();
    let mut pairs = Vec::new();
    rows(open(path)?, path, |hit| {
        if seen.insert(hit.clone()) {
            pairs.push(hit);
        }
    })?;
    Ok(pairs)
}

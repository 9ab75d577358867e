//! FASTA helpers: identifiers, counts and concatenation.
//!
//! Only headers are interpreted. The id of a record is the first
//! whitespace-delimited token after `>`.

use bio::io::fasta;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::errors::{RunError, RunResult};
use crate::domain::models::SequenceIdSet;

fn open(path: &Path) -> RunResult<fasta::Reader<io::BufReader<File>>> {
    let file = File::open(path).map_err(|e| malformed(path, &e))?;
    Ok(fasta::Reader::new(file))
}

fn malformed(path: &Path, err: &io::Error) -> RunError {
    RunError::MalformedSequences {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Distinct record ids of a FASTA file.
pub fn read_ids(path: &Path) -> RunResult<SequenceIdSet> {
    let mut ids = SequenceIdSet::new();
    for record in open(path)?.records() {
        let record = record.map_err(|e| malformed(path, &e))?;
        ids.add(record.id());
    }
    Ok(ids)
}

/// Number of records in a FASTA file (duplicates included).
pub fn count_sequences(path: &Path) -> RunResult<usize> {
    let mut count = 0;
    for record in open(path)?.records() {
        record.map_err(|e| malformed(path, &e))?;
        count += 1;
    }
    Ok(count)
}

/// Write one id per line, sorted, for the id-based extraction tools.
pub fn write_ids(ids: &SequenceIdSet, path: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for id in ids.sorted() {
        writeln!(out, "{id}")?;
    }
    out.flush()
}

/// Byte-for-byte concatenation of `inputs`, in order, into `output`.
pub fn concatenate(inputs: &[PathBuf], output: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(output)?);
    for input in inputs {
        let mut file = File::open(input)?;
        io::copy(&mut file, &mut out)?;
    }
    out.flush()
}

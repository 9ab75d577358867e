//! `network` command: hit pairs of one round as an edge list.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::report::{self, HitPair};

#[derive(Args, Debug)]
pub struct NetworkArgs {
    /// Round label repeated verbatim in the third column
    pub round: String,

    /// Tabular search report (query id in column 1, subject id in column 2)
    pub report: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct NetworkOutput {
    pub round: String,
    pub pairs: Vec<HitPair>,
}

impl CommandOutput for NetworkOutput {
    fn to_human(&self) -> String {
        self.pairs
            .iter()
            .map(|pair| format!("{}\t{}\t{}", pair.query, pair.subject, self.round))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn execute(args: &NetworkArgs, json_mode: bool) -> Result<()> {
    let pairs = report::distinct_pairs(&args.report)?;
    tracing::debug!(round = %args.round, pairs = pairs.len(), "read report");
    output(
        &NetworkOutput {
            round: args.round.clone(),
            pairs,
        },
        json_mode,
    );
    Ok(())
}

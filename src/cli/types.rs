//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::network::NetworkArgs;
use crate::cli::commands::run::RunArgs;

#[derive(Parser, Debug)]
#[command(name = "itersearch")]
#[command(
    about = "Iterative homology search: new hits become queries until the yield of new hits converges",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// YAML config file, merged over `.itersearch.yaml` and the defaults
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search repeatedly until new hits stop accumulating
    Run(RunArgs),

    /// Print the distinct query/subject pairs of a search report
    Network(NetworkArgs),
}

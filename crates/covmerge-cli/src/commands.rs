//! CLI argument definitions using clap

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// coverage_merger: merge coverage reports from sharded test runs into one
///
/// The first path is the primary report, the last path is the target, and
/// every path in between is an increment report, merged in the order given.
#[derive(Parser, Debug)]
#[command(name = "coverage_merger")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Exclude packages whose name starts with PREFIX (repeatable)
    #[arg(
        long = "ignore",
        value_name = "PREFIX",
        action = ArgAction::Append,
        require_equals = true
    )]
    pub ignore: Vec<String>,

    /// Print progress and every merge decision
    #[arg(long)]
    pub verbose: bool,

    /// PRIMARY [INCREMENT...] TARGET. Options after the first path are read as paths.
    #[arg(value_name = "PATHS", trailing_var_arg = true)]
    pub paths: Vec<PathBuf>,
}

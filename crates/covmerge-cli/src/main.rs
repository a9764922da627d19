//! coverage_merger: merge coverage reports from sharded test runs
//!
//! ## Usage
//!
//! ```bash
//! coverage_merger primary.xml target.xml
//! coverage_merger --ignore=gen. shard-0.xml shard-1.xml shard-2.xml merged.xml
//! coverage_merger --verbose shard-0.xml shard-1.xml merged.xml
//! ```

use clap::Parser;
use covmerge_cli::{logging, Cli, CliConfig, CliResult, MergeRunner};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_usage() {
                println!("{e}");
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let config = CliConfig::from_cli(cli)?;
    tracing::debug!(?config, "configuration");
    MergeRunner::new(config).run()?;
    Ok(())
}

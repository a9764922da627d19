//! Merge runner: load, merge, write

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use covmerge::{CoverageMerger, MergeSummary, Report, ReportSource};

/// Runs one merge described by a [`CliConfig`]
#[derive(Debug)]
pub struct MergeRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl MergeRunner {
    /// Create a new runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter = ProgressReporter::new(config.color.should_color(), config.verbosity);
        Self { config, reporter }
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Load every input, merge, and write the target.
    ///
    /// The target is only touched once the merge has fully succeeded.
    pub fn run(&mut self) -> CliResult<MergeSummary> {
        let config = &self.config;
        self.reporter
            .field("Source file", &config.primary.display().to_string());
        for increment in &config.increments {
            self.reporter
                .field("Increment file", &increment.display().to_string());
        }
        self.reporter
            .field("Target file", &config.target.display().to_string());

        let primary = Report::load(&config.primary, ReportSource::Primary)?;
        let increments = config
            .increments
            .iter()
            .enumerate()
            .map(|(i, path)| Report::load(path, ReportSource::Increment(i)))
            .collect::<Result<Vec<_>, _>>()?;
        self.reporter.info("Documents parsed");

        let merged = CoverageMerger::new(&primary, &increments)
            .with_ignore(config.ignore_filter())
            .with_observer(&mut self.reporter)
            .merge()?;
        merged.write_to(&config.target)?;

        let summary = *merged.summary();
        tracing::info!(target_file = %config.target.display(), %summary, "merge written");
        self.reporter.summary(&summary);
        Ok(summary)
    }
}

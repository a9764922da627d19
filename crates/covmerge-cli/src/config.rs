//! CLI configuration

use crate::commands::Cli;
use crate::error::{CliError, CliResult};
use covmerge::IgnoreFilter;
use std::path::PathBuf;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Silent on success
    #[default]
    Normal,
    /// Progress lines and every merge decision
    Verbose,
}

impl Verbosity {
    /// Check if verbose
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose)
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stdout()),
        }
    }
}

/// Everything one merge run needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Package name prefixes to exclude
    pub ignore_prefixes: Vec<String>,
    /// Report that seeds the output
    pub primary: PathBuf,
    /// Reports merged in, in order
    pub increments: Vec<PathBuf>,
    /// Where the merged report is written
    pub target: PathBuf,
}

impl CliConfig {
    /// Merge `primary` alone into `target`
    #[must_use]
    pub fn new(primary: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
            ignore_prefixes: Vec::new(),
            primary: primary.into(),
            increments: Vec::new(),
            target: target.into(),
        }
    }

    /// Build from parsed arguments: first path is the primary, last is the
    /// target, anything between is an increment.
    pub fn from_cli(cli: &Cli) -> CliResult<Self> {
        let [primary, middle @ .., target] = cli.paths.as_slice() else {
            return Err(CliError::NotEnoughArguments);
        };

        let verbosity = if cli.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        let mut config = Self::new(primary, target).with_verbosity(verbosity);
        for increment in middle {
            config = config.with_increment(increment);
        }
        for prefix in &cli.ignore {
            config = config.with_ignore_prefix(prefix);
        }
        Ok(config)
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Append an increment report
    #[must_use]
    pub fn with_increment(mut self, path: impl Into<PathBuf>) -> Self {
        self.increments.push(path.into());
        self
    }

    /// Exclude packages starting with `prefix`
    #[must_use]
    pub fn with_ignore_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ignore_prefixes.push(prefix.into());
        self
    }

    /// Ignore filter built from the configured prefixes
    #[must_use]
    pub fn ignore_filter(&self) -> IgnoreFilter {
        self.ignore_prefixes.iter().cloned().collect()
    }
}

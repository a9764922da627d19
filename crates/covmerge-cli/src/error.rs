//! Error types for the CLI

use covmerge::MergeError;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Fewer than two paths were given
    #[error("coverage_merger: not enough arguments")]
    NotEnoughArguments,

    /// Loading, merging or writing failed
    #[error("{0}")]
    Merge(#[from] MergeError),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit status for this error
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        1
    }

    /// Whether the message belongs on stdout rather than stderr
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::NotEnoughArguments)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_not_enough_arguments_message() {
        let err = CliError::NotEnoughArguments;
        assert_eq!(err.to_string(), "coverage_merger: not enough arguments");
        assert_eq!(err.exit_code(), 1);
        assert!(err.is_usage());
    }

    #[test]
    fn test_merge_error_passes_through() {
        let err: CliError = MergeError::structural("no <packages>").into();
        assert!(err.to_string().contains("no <packages>"));
        assert_eq!(err.exit_code(), 1);
        assert!(!err.is_usage());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}

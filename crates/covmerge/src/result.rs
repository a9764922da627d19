//! Result and error types for covmerge.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for merge operations
pub type MergeResult<T> = Result<T, MergeError>;

/// Errors that can occur while loading, merging or writing reports
#[derive(Debug, Error)]
pub enum MergeError {
    /// Input file is missing, unreadable or not well-formed XML
    #[error("Failed to parse {}: {message}", path.display())]
    Parse {
        /// Path of the offending input
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Expected element or attribute is missing or malformed
    #[error("Malformed coverage report: {message}")]
    Structural {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl MergeError {
    /// Create a parse error for the given input path
    #[must_use]
    pub fn parse(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a structural error
    #[must_use]
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural {
            message: message.into(),
        }
    }

    /// Whether this error was caused by bad input rather than the environment
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Structural { .. })
    }
}

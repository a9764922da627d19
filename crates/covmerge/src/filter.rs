//! Package/class exclusion rules applied before any source is considered.

use std::collections::BTreeSet;

/// Literal text that marks a rate as zero.
///
/// Compared as text, so `"0"` or `"0.00"` are *not* zero.
pub const ZERO_RATE: &str = "0.0";

/// True iff some prefix is a literal, case-sensitive string prefix of `name`
#[must_use]
pub fn is_ignored<S: AsRef<str>>(name: &str, prefixes: &[S]) -> bool {
    prefixes.iter().any(|prefix| name.starts_with(prefix.as_ref()))
}

/// Set of package-name prefixes to exclude from the merged report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreFilter {
    prefixes: BTreeSet<String>,
}

impl IgnoreFilter {
    /// Filter that ignores nothing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.insert(prefix.into());
        self
    }

    /// Whether `name` starts with any configured prefix
    #[must_use]
    pub fn is_ignored(&self, name: &str) -> bool {
        self.prefixes.iter().any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// Configured prefixes, sorted
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }

    /// Number of distinct prefixes
    #[must_use]
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Whether no prefixes are configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for IgnoreFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            prefixes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Zero-coverage test shared by packages and classes
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroCoverageFilter;

impl ZeroCoverageFilter {
    /// True iff both rates are exactly [`ZERO_RATE`]
    #[must_use]
    pub fn is_zero(branch_rate: &str, line_rate: &str) -> bool {
        branch_rate == ZERO_RATE && line_rate == ZERO_RATE
    }
}

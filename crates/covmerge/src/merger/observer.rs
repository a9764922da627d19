//! Merge decisions as events, plus the running tally kept from them.

use crate::report::ReportSource;
use std::fmt;

/// Why a package or class did not make it into the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Package name matches an ignore prefix
    Ignored,
    /// Both rates are the literal zero text
    ZeroCoverage,
    /// A package of that name is already in the output
    AlreadyPresent,
    /// Another increment offers the same entry with a strictly higher line rate
    Outranked {
        /// Increment holding the better copy
        by: ReportSource,
        /// Its line rate, as written
        line_rate: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignored => write!(f, "ignored"),
            Self::ZeroCoverage => write!(f, "zero coverage"),
            Self::AlreadyPresent => write!(f, "already present"),
            Self::Outranked { by, line_rate } => {
                write!(f, "outranked by {by} (line-rate {line_rate})")
            }
        }
    }
}

/// One decision taken by the merger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeEvent {
    /// Package copied from the primary report
    PackageSeeded {
        /// Package name
        package: String,
    },
    /// Package missing from the output copied from an increment
    PackageAdmitted {
        /// Package name
        package: String,
        /// Increment it came from
        source: ReportSource,
    },
    /// Package left out
    PackageSkipped {
        /// Package name
        package: String,
        /// Report that offered it
        source: ReportSource,
        /// Why
        reason: SkipReason,
    },
    /// Class missing from a merged package copied from an increment
    ClassAdded {
        /// Owning package
        package: String,
        /// Class name
        class: String,
        /// Increment it came from
        source: ReportSource,
    },
    /// Class left out
    ClassSkipped {
        /// Owning package
        package: String,
        /// Class name
        class: String,
        /// Report that offered it
        source: ReportSource,
        /// Why
        reason: SkipReason,
    },
}

impl fmt::Display for MergeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PackageSeeded { package } => write!(f, "{package}"),
            Self::PackageAdmitted { package, source } => {
                write!(f, "{package} (from {source})")
            }
            Self::PackageSkipped {
                package,
                source,
                reason,
            } => write!(f, "skip {package} from {source}: {reason}"),
            Self::ClassAdded {
                package,
                class,
                source,
            } => write!(f, "{package}: + {class} (from {source})"),
            Self::ClassSkipped {
                package,
                class,
                source,
                reason,
            } => write!(f, "{package}: skip {class} from {source}: {reason}"),
        }
    }
}

/// Receives every [`MergeEvent`] as it happens
pub trait MergeObserver {
    /// Called once per decision, in decision order
    fn on_event(&mut self, event: &MergeEvent);
}

impl<F> MergeObserver for F
where
    F: FnMut(&MergeEvent),
{
    fn on_event(&mut self, event: &MergeEvent) {
        self(event);
    }
}

/// Counters over all decisions of one merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Packages copied from the primary report
    pub packages_seeded: usize,
    /// Packages copied from increments
    pub packages_admitted: usize,
    /// Classes added to already merged packages
    pub classes_added: usize,
    /// Packages dropped by an ignore prefix
    pub packages_ignored: usize,
    /// Packages dropped for zero coverage
    pub zero_packages: usize,
    /// Classes dropped for zero coverage
    pub zero_classes: usize,
    /// Candidates beaten by another increment
    pub outranked: usize,
}

impl MergeSummary {
    /// Fold one event into the counters
    pub fn record(&mut self, event: &MergeEvent) {
        match event {
            MergeEvent::PackageSeeded { .. } => self.packages_seeded += 1,
            MergeEvent::PackageAdmitted { .. } => self.packages_admitted += 1,
            MergeEvent::ClassAdded { .. } => self.classes_added += 1,
            MergeEvent::PackageSkipped { reason, .. } => match reason {
                SkipReason::Ignored => self.packages_ignored += 1,
                SkipReason::ZeroCoverage => self.zero_packages += 1,
                SkipReason::Outranked { .. } => self.outranked += 1,
                SkipReason::AlreadyPresent => {}
            },
            MergeEvent::ClassSkipped { reason, .. } => match reason {
                SkipReason::ZeroCoverage => self.zero_classes += 1,
                SkipReason::Outranked { .. } => self.outranked += 1,
                SkipReason::Ignored | SkipReason::AlreadyPresent => {}
            },
        }
    }

    /// Packages in the output
    #[must_use]
    pub const fn packages_total(&self) -> usize {
        self.packages_seeded + self.packages_admitted
    }
}

impl fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} packages ({} from primary, {} from increments), {} classes added, \
             {} ignored, {} zero-coverage entries dropped, {} outranked",
            self.packages_total(),
            self.packages_seeded,
            self.packages_admitted,
            self.classes_added,
            self.packages_ignored,
            self.zero_packages + self.zero_classes,
            self.outranked,
        )
    }
}

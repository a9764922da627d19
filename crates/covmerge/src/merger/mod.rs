//! Multi-source coverage merge.
//!
//! The output is assembled in three passes over the inputs:
//!
//! 1. **Seed**: every package of the primary report that is neither ignored
//!    nor zero-coverage is copied, minus its zero-coverage classes.
//! 2. **Admit**: packages missing from the output are taken from an
//!    increment, unless some *other* increment offers the same package with
//!    a strictly greater `line-rate`. On ties the earliest increment wins.
//! 3. **Fill**: classes missing from an already merged package are taken from
//!    an increment under the same "strictly greater elsewhere" veto.
//!
//! The veto is pairwise: each candidate is only checked against each other
//! increment on its own, never against a computed maximum. A candidate can
//! therefore be vetoed by a copy that is itself never admitted.

mod context;
mod observer;

pub use observer::{MergeEvent, MergeObserver, MergeSummary, SkipReason};

use crate::document::Document;
use crate::filter::{IgnoreFilter, ZeroCoverageFilter};
use crate::report::{ClassEntry, Package, Report, ReportSource};
use crate::result::MergeResult;
use context::{MergeContext, MergedPackage};
use std::collections::HashMap;
use std::path::Path;

/// Merge `increments` into `primary`, dropping packages matched by `ignore`
pub fn merge_reports(
    primary: &Report,
    increments: &[Report],
    ignore: IgnoreFilter,
) -> MergeResult<MergedReport> {
    CoverageMerger::new(primary, increments)
        .with_ignore(ignore)
        .merge()
}

/// Configures and runs one merge
pub struct CoverageMerger<'a> {
    primary: &'a Report,
    increments: &'a [Report],
    ignore: IgnoreFilter,
    observer: Option<&'a mut dyn MergeObserver>,
}

impl std::fmt::Debug for CoverageMerger<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverageMerger")
            .field("primary", &self.primary.label())
            .field("increments", &self.increments.len())
            .field("ignore", &self.ignore)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl<'a> CoverageMerger<'a> {
    /// Merge `increments`, in order, into `primary`
    #[must_use]
    pub fn new(primary: &'a Report, increments: &'a [Report]) -> Self {
        Self {
            primary,
            increments,
            ignore: IgnoreFilter::new(),
            observer: None,
        }
    }

    /// Exclude packages by name prefix
    #[must_use]
    pub fn with_ignore(mut self, ignore: IgnoreFilter) -> Self {
        self.ignore = ignore;
        self
    }

    /// Report every decision to `observer`
    #[must_use]
    pub fn with_observer(mut self, observer: &'a mut dyn MergeObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run all three passes and hand back the finished output
    pub fn merge(mut self) -> MergeResult<MergedReport> {
        let mut ctx = MergeContext::new(self.primary)?;
        tracing::debug!(
            primary = self.primary.label(),
            increments = self.increments.len(),
            ignored_prefixes = self.ignore.len(),
            "merge started"
        );

        self.seed_from_primary(&mut ctx);
        self.admit_missing_packages(&mut ctx);
        self.fill_missing_classes(&mut ctx);

        tracing::debug!(summary = %ctx.summary, "merge finished");
        Ok(ctx.finish())
    }

    fn seed_from_primary(&mut self, ctx: &mut MergeContext) {
        let primary = self.primary;
        for package in primary.packages() {
            if let Some(reason) = self.exclusion(package) {
                self.emit(ctx, MergeEvent::PackageSkipped {
                    package: package.name.clone(),
                    source: ReportSource::Primary,
                    reason,
                });
                continue;
            }
            self.emit(ctx, MergeEvent::PackageSeeded {
                package: package.name.clone(),
            });
            self.copy_package(ctx, primary, package);
        }
    }

    fn admit_missing_packages(&mut self, ctx: &mut MergeContext) {
        let increments = self.increments;
        for (index, increment) in increments.iter().enumerate() {
            let source = increment.source();
            for package in increment.packages() {
                let rejection = if ctx.contains_package(&package.name) {
                    Some(SkipReason::AlreadyPresent)
                } else if let Some(reason) = self.exclusion(package) {
                    Some(reason)
                } else {
                    self.outranking_package(index, package)
                };

                match rejection {
                    Some(reason) => self.emit(ctx, MergeEvent::PackageSkipped {
                        package: package.name.clone(),
                        source,
                        reason,
                    }),
                    None => {
                        self.emit(ctx, MergeEvent::PackageAdmitted {
                            package: package.name.clone(),
                            source,
                        });
                        self.copy_package(ctx, increment, package);
                    }
                }
            }
        }
    }

    fn fill_missing_classes(&mut self, ctx: &mut MergeContext) {
        let increments = self.increments;
        for (index, increment) in increments.iter().enumerate() {
            let source = increment.source();
            for package in increment.packages() {
                if !ctx.contains_package(&package.name) {
                    continue;
                }
                for class in package.classes() {
                    let present = ctx
                        .package(&package.name)
                        .is_some_and(|merged| merged.contains(&class.name));
                    if present {
                        tracing::trace!(
                            package = %package.name,
                            class = %class.name,
                            %source,
                            "class already merged"
                        );
                        continue;
                    }

                    let rejection = if is_zero_class(class) {
                        Some(SkipReason::ZeroCoverage)
                    } else {
                        self.outranking_class(index, &package.name, class)
                    };

                    match rejection {
                        Some(reason) => self.emit(ctx, MergeEvent::ClassSkipped {
                            package: package.name.clone(),
                            class: class.name.clone(),
                            source,
                            reason,
                        }),
                        None => {
                            ctx.add_class(&package.name, increment, class);
                            self.emit(ctx, MergeEvent::ClassAdded {
                                package: package.name.clone(),
                                class: class.name.clone(),
                                source,
                            });
                        }
                    }
                }
            }
        }
    }

    /// Copy a whole package: `name`, `complexity` and its non-zero classes
    fn copy_package(&mut self, ctx: &mut MergeContext, source: &Report, package: &Package) {
        ctx.add_package(package);
        for class in package.classes() {
            if is_zero_class(class) {
                self.emit(ctx, MergeEvent::ClassSkipped {
                    package: package.name.clone(),
                    class: class.name.clone(),
                    source: source.source(),
                    reason: SkipReason::ZeroCoverage,
                });
                continue;
            }
            ctx.add_class(&package.name, source, class);
        }
    }

    fn exclusion(&self, package: &Package) -> Option<SkipReason> {
        if self.ignore.is_ignored(&package.name) {
            Some(SkipReason::Ignored)
        } else if ZeroCoverageFilter::is_zero(
            package.branch_rate.as_str(),
            package.line_rate.as_str(),
        ) {
            Some(SkipReason::ZeroCoverage)
        } else {
            None
        }
    }

    /// First other increment whose same-named package has a strictly greater line rate
    fn outranking_package(&self, index: usize, package: &Package) -> Option<SkipReason> {
        let rate = package.line_rate.value();
        for (other_index, other) in self.increments.iter().enumerate() {
            if other_index == index {
                continue;
            }
            if let Some(rival) = other.package(&package.name) {
                if rival.line_rate.value() > rate {
                    return Some(SkipReason::Outranked {
                        by: other.source(),
                        line_rate: rival.line_rate.to_string(),
                    });
                }
            }
        }
        None
    }

    /// First other increment whose same-named class has a strictly greater line rate
    fn outranking_class(
        &self,
        index: usize,
        package: &str,
        class: &ClassEntry,
    ) -> Option<SkipReason> {
        let rate = class.line_rate.value();
        for (other_index, other) in self.increments.iter().enumerate() {
            if other_index == index {
                continue;
            }
            let Some(rival) = other.package(package).and_then(|p| p.class(&class.name)) else {
                continue;
            };
            if rival.line_rate.value() > rate {
                return Some(SkipReason::Outranked {
                    by: other.source(),
                    line_rate: rival.line_rate.to_string(),
                });
            }
        }
        None
    }

    fn emit(&mut self, ctx: &mut MergeContext, event: MergeEvent) {
        match &event {
            MergeEvent::PackageSkipped { .. } | MergeEvent::ClassSkipped { .. } => {
                tracing::trace!(%event, "skipped");
            }
            _ => tracing::debug!(%event, "merged"),
        }
        ctx.summary.record(&event);
        if let Some(observer) = self.observer.as_mut() {
            observer.on_event(&event);
        }
    }
}

fn is_zero_class(class: &ClassEntry) -> bool {
    ZeroCoverageFilter::is_zero(class.branch_rate.as_str(), class.line_rate.as_str())
}

/// The merged output document and what went into it
#[derive(Debug)]
pub struct MergedReport {
    document: Document,
    packages: Vec<MergedPackage>,
    index: HashMap<String, usize>,
    summary: MergeSummary,
}

impl MergedReport {
    fn new(
        document: Document,
        packages: Vec<MergedPackage>,
        index: HashMap<String, usize>,
        summary: MergeSummary,
    ) -> Self {
        Self {
            document,
            packages,
            index,
            summary,
        }
    }

    /// Package names in output order
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(|p| p.name.as_str())
    }

    /// Class names of a merged package in output order, `None` if absent
    #[must_use]
    pub fn class_names(&self, package: &str) -> Option<Vec<&str>> {
        let merged = &self.packages[*self.index.get(package)?];
        Some(merged.classes.iter().map(String::as_str).collect())
    }

    /// Whether `package` made it into the output
    #[must_use]
    pub fn contains_package(&self, package: &str) -> bool {
        self.index.contains_key(package)
    }

    /// Decision counters
    #[must_use]
    pub const fn summary(&self) -> &MergeSummary {
        &self.summary
    }

    /// The output tree
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Serialize the output tree
    pub fn to_xml_string(&self) -> MergeResult<String> {
        self.document.to_xml_string()
    }

    /// Write the output tree to `path`, replacing it atomically
    pub fn write_to(&self, path: &Path) -> MergeResult<()> {
        self.document.write_to(path)
    }
}
